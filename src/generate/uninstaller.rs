//! uninstall.sh: removes everything install.sh created.

use anyhow::Result;

use super::BundleInfo;

const TEMPLATE: &str = r#"#!/bin/sh
# Uninstaller for @PROJECT_NAME@
set -e

SELF_DIR="$(cd "$(dirname "$(readlink -f "$0")")" && pwd)"

# An installed copy removes what install.sh recorded; the environment only
# applies when running from the unpacked bundle.
if [ -f "$SELF_DIR/install.env" ]; then
    . "$SELF_DIR/install.env"
    INSTALL_DIR="$INSTALLED_DIR"
    BIN_DIR="$INSTALLED_BIN_DIR"
    SYSTEMD_DIR="$INSTALLED_SYSTEMD_DIR"
    SYSTEMCTL="$INSTALLED_SYSTEMCTL"
else
    INSTALL_DIR="${INSTALL_DIR:-@INSTALL_DIR@}"
    BIN_DIR="${BIN_DIR:-/usr/local/bin}"
    SYSTEMD_DIR="${SYSTEMD_DIR:-/etc/systemd/system}"
    SYSTEMCTL="${SYSTEMCTL:-systemctl}"
fi
UNIT_FILE="$SYSTEMD_DIR/@SERVICE_NAME@.service"

if [ "$(id -u)" -ne 0 ]; then
    echo "Error: uninstall.sh must be run as root (try: sudo ./uninstall.sh)" >&2
    exit 1
fi

if [ -z "$INSTALL_DIR" ] || [ "$INSTALL_DIR" = "/" ]; then
    echo "Error: refusing to remove '$INSTALL_DIR'" >&2
    exit 1
fi

echo "Uninstalling @PROJECT_NAME@"

HAVE_SYSTEMCTL=0
if command -v "$SYSTEMCTL" >/dev/null 2>&1; then
    HAVE_SYSTEMCTL=1
fi

if [ "$HAVE_SYSTEMCTL" -eq 1 ]; then
    "$SYSTEMCTL" stop @SERVICE_NAME@ >/dev/null 2>&1 || true
    "$SYSTEMCTL" disable @SERVICE_NAME@ >/dev/null 2>&1 || true
fi

if [ -e "$UNIT_FILE" ]; then
    rm -f "$UNIT_FILE"
    echo "Removed $UNIT_FILE"
fi

if [ -L "$BIN_DIR/@LAUNCHER@" ] || [ -e "$BIN_DIR/@LAUNCHER@" ]; then
    rm -f "$BIN_DIR/@LAUNCHER@"
    echo "Removed $BIN_DIR/@LAUNCHER@"
fi

if [ -d "$INSTALL_DIR" ]; then
    rm -rf "$INSTALL_DIR"
    echo "Removed $INSTALL_DIR"
fi

if [ "$HAVE_SYSTEMCTL" -eq 1 ]; then
    "$SYSTEMCTL" daemon-reload >/dev/null 2>&1 || true
fi

echo "@PROJECT_NAME@ uninstalled."
"#;

pub fn render(info: &BundleInfo) -> Result<String> {
    info.render(TEMPLATE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::sample_info;

    #[test]
    fn test_uninstaller_removes_installed_paths() {
        let script = render(&sample_info()).unwrap();
        assert!(script.contains(r#"INSTALL_DIR="${INSTALL_DIR:-/opt/claude-router}""#));
        assert!(script.contains(r#"UNIT_FILE="$SYSTEMD_DIR/claude-router.service""#));
        assert!(script.contains(r#"rm -f "$BIN_DIR/ccr""#));
        assert!(script.contains(r#"rm -rf "$INSTALL_DIR""#));
        assert!(script.contains("stop claude-router"));
        assert!(script.contains("disable claude-router"));
    }

    #[test]
    fn test_uninstaller_prefers_recorded_targets() {
        let script = render(&sample_info()).unwrap();
        let source = script.find(r#". "$SELF_DIR/install.env""#).unwrap();
        let fallback = script.find(r#"INSTALL_DIR="${INSTALL_DIR:-/opt/claude-router}""#).unwrap();
        assert!(source < fallback);
        assert!(script.contains(r#"INSTALL_DIR="$INSTALLED_DIR""#));
        assert!(script.contains(r#"BIN_DIR="$INSTALLED_BIN_DIR""#));
        assert!(script.contains(r#"SYSTEMD_DIR="$INSTALLED_SYSTEMD_DIR""#));
    }

    #[test]
    fn test_uninstaller_requires_root() {
        let script = render(&sample_info()).unwrap();
        assert!(script.contains(r#"if [ "$(id -u)" -ne 0 ]; then"#));
    }
}
