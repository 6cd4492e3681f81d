//! systemd service unit.

use anyhow::Result;

use super::BundleInfo;

const TEMPLATE: &str = r#"[Unit]
Description=@PROJECT_NAME@ @PROJECT_VERSION@
After=network.target

[Service]
Type=simple
ExecStart=@EXEC_START@
WorkingDirectory=@INSTALL_DIR@
Environment=NODE_ENV=production
Restart=always
RestartSec=5

[Install]
WantedBy=multi-user.target
"#;

/// Command line the service runs: the installed launcher plus arguments.
pub fn exec_start(info: &BundleInfo) -> String {
    let launcher = format!("{}/{}", info.install_dir, info.launcher_name);
    let args = info.service_args.trim();
    if args.is_empty() {
        launcher
    } else {
        format!("{} {}", launcher, args)
    }
}

pub fn render(info: &BundleInfo) -> Result<String> {
    info.render(&TEMPLATE.replace("@EXEC_START@", &exec_start(info)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::sample_info;

    #[test]
    fn test_unit_contents() {
        let unit = render(&sample_info()).unwrap();
        assert!(unit.contains("Type=simple\n"));
        assert!(unit.contains("ExecStart=/opt/claude-router/ccr start\n"));
        assert!(unit.contains("Restart=always\n"));
        assert!(unit.contains("RestartSec=5\n"));
        assert!(unit.contains("WantedBy=multi-user.target\n"));
    }

    #[test]
    fn test_exec_start_without_args() {
        let info = BundleInfo {
            service_args: String::new(),
            install_dir: "/srv/router".to_string(),
            ..sample_info()
        };
        assert_eq!(exec_start(&info), "/srv/router/ccr");
    }
}
