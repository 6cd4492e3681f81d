//! README.md shipped at the top of the bundle.

use anyhow::Result;

use super::BundleInfo;

const TEMPLATE: &str = r#"# @PROJECT_NAME@ @PROJECT_VERSION@ installer

Self-contained bundle of @PROJECT_NAME@ with Node.js v@NODE_VERSION@ (linux-@ARCH@).
@BUILT_ON@
No system Node.js installation is required.

## Contents

| Path | Purpose |
|------|---------|
| `nodejs/` | Bundled Node.js runtime |
| `app/` | Application files |
| `@LAUNCHER@` | Launcher script |
| `install.sh` | Installer (run as root) |
| `uninstall.sh` | Uninstaller (run as root) |
| `@SERVICE_NAME@.service` | systemd unit |
| `bundle.json` | Build metadata |

## Install

```sh
tar xzf <archive>.tar.gz
cd <archive>
sudo ./install.sh
```

This installs to `@INSTALL_DIR@`, links `/usr/local/bin/@LAUNCHER@` and
installs `/etc/systemd/system/@SERVICE_NAME@.service`. Set `INSTALL_DIR`,
`BIN_DIR` or `SYSTEMD_DIR` in the environment to change these locations
(for example `sudo INSTALL_DIR=/srv/router ./install.sh`).

## Usage

```sh
@LAUNCHER@ --help
```

## Running as a service

```sh
sudo systemctl enable --now @SERVICE_NAME@
sudo systemctl status @SERVICE_NAME@
journalctl -u @SERVICE_NAME@ -f
```

The unit restarts the application automatically (`Restart=always`, 5s delay).

## Uninstall

```sh
sudo @INSTALL_DIR@/uninstall.sh
```

Run the copy inside the install directory you chose. It stops and disables
the service, then removes the unit file, the launcher link and the install
directory recorded by install.sh in `install.env`.
"#;

pub fn render(info: &BundleInfo) -> Result<String> {
    let built_on = match &info.ubuntu_version {
        Some(version) => format!("Built on Ubuntu {}.", version),
        None => "Built for generic Linux (Ubuntu version not detected).".to_string(),
    };
    info.render(&TEMPLATE.replace("@BUILT_ON@", &built_on))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::sample_info;

    #[test]
    fn test_readme_mentions_install_and_uninstall() {
        let readme = render(&sample_info()).unwrap();
        assert!(readme.contains("sudo ./install.sh"));
        assert!(readme.contains("sudo /opt/claude-router/uninstall.sh"));
        assert!(readme.contains("Built on Ubuntu 22.04."));
        assert!(readme.contains("systemctl enable --now claude-router"));
    }

    #[test]
    fn test_readme_without_ubuntu() {
        let info = BundleInfo {
            ubuntu_version: None,
            ..sample_info()
        };
        assert!(render(&info).unwrap().contains("generic Linux"));
    }
}
