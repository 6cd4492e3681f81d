//! install.sh: copies the bundle into place and registers the service.
//!
//! Target locations default to the values baked in at packaging time and
//! can be redirected with INSTALL_DIR, BIN_DIR, SYSTEMD_DIR and SYSTEMCTL.

use anyhow::Result;

use super::BundleInfo;

const TEMPLATE: &str = r#"#!/bin/sh
# Installer for @PROJECT_NAME@ @PROJECT_VERSION@
set -e

DEFAULT_INSTALL_DIR="@INSTALL_DIR@"
INSTALL_DIR="${INSTALL_DIR:-$DEFAULT_INSTALL_DIR}"
BIN_DIR="${BIN_DIR:-/usr/local/bin}"
SYSTEMD_DIR="${SYSTEMD_DIR:-/etc/systemd/system}"
SYSTEMCTL="${SYSTEMCTL:-systemctl}"
BUILT_FOR_UBUNTU="@UBUNTU_VERSION@"

if [ "$(id -u)" -ne 0 ]; then
    echo "Error: install.sh must be run as root (try: sudo ./install.sh)" >&2
    exit 1
fi

if [ -z "$INSTALL_DIR" ] || [ "$INSTALL_DIR" = "/" ]; then
    echo "Error: refusing to install into '$INSTALL_DIR'" >&2
    exit 1
fi

# Target paths are spliced into sed expressions and install.env.
check_path() {
    case "$2" in
        /*) ;;
        *) echo "Error: $1 must be an absolute path, got '$2'" >&2; exit 1 ;;
    esac
    case "$2" in
        *[!A-Za-z0-9._+/-]*)
            echo "Error: $1 may only contain letters, digits and . _ + - /, got '$2'" >&2
            exit 1
            ;;
    esac
}
check_path INSTALL_DIR "$INSTALL_DIR"
check_path BIN_DIR "$BIN_DIR"
check_path SYSTEMD_DIR "$SYSTEMD_DIR"
case "$SYSTEMCTL" in
    ""|*[!A-Za-z0-9._+/-]*)
        echo "Error: SYSTEMCTL may only contain letters, digits and . _ + - /" >&2
        exit 1
        ;;
esac

SRC_DIR="$(cd "$(dirname "$0")" && pwd)"

for required in nodejs/bin/node app/@ENTRY_POINT@ @LAUNCHER@ uninstall.sh @SERVICE_NAME@.service; do
    if [ ! -e "$SRC_DIR/$required" ]; then
        echo "Error: bundle is incomplete, missing $required" >&2
        exit 1
    fi
done

if [ -n "$BUILT_FOR_UBUNTU" ] && [ -f /etc/os-release ]; then
    HOST_UBUNTU="$(. /etc/os-release && echo "${VERSION_ID:-}")"
    if [ "$HOST_UBUNTU" != "$BUILT_FOR_UBUNTU" ]; then
        echo "Warning: bundle was built on Ubuntu $BUILT_FOR_UBUNTU, this host reports ${HOST_UBUNTU:-unknown}"
    fi
fi

echo "Installing @PROJECT_NAME@ @PROJECT_VERSION@ to $INSTALL_DIR"

if [ -d "$INSTALL_DIR" ]; then
    echo "Replacing existing installation"
    rm -rf "$INSTALL_DIR"
fi
mkdir -p "$INSTALL_DIR"

cp -a "$SRC_DIR/nodejs" "$SRC_DIR/app" "$INSTALL_DIR/"
cp "$SRC_DIR/@LAUNCHER@" "$SRC_DIR/uninstall.sh" "$INSTALL_DIR/"
for doc in README.md bundle.json; do
    if [ -f "$SRC_DIR/$doc" ]; then
        cp "$SRC_DIR/$doc" "$INSTALL_DIR/"
    fi
done
chmod 755 "$INSTALL_DIR/@LAUNCHER@" "$INSTALL_DIR/uninstall.sh" "$INSTALL_DIR/nodejs/bin/node"

# Read back by the installed uninstall.sh
cat > "$INSTALL_DIR/install.env" <<EOF
INSTALLED_DIR='$INSTALL_DIR'
INSTALLED_BIN_DIR='$BIN_DIR'
INSTALLED_SYSTEMD_DIR='$SYSTEMD_DIR'
INSTALLED_SYSTEMCTL='$SYSTEMCTL'
EOF
chmod 644 "$INSTALL_DIR/install.env"

mkdir -p "$BIN_DIR"
ln -sf "$INSTALL_DIR/@LAUNCHER@" "$BIN_DIR/@LAUNCHER@"
echo "Linked $BIN_DIR/@LAUNCHER@"

mkdir -p "$SYSTEMD_DIR"
DEFAULT_PATTERN="$(printf '%s' "$DEFAULT_INSTALL_DIR" | sed 's/[][.*^$]/\\&/g')"
sed "s#$DEFAULT_PATTERN#$INSTALL_DIR#g" "$SRC_DIR/@SERVICE_NAME@.service" > "$SYSTEMD_DIR/@SERVICE_NAME@.service"
chmod 644 "$SYSTEMD_DIR/@SERVICE_NAME@.service"
echo "Installed $SYSTEMD_DIR/@SERVICE_NAME@.service"

if command -v "$SYSTEMCTL" >/dev/null 2>&1; then
    "$SYSTEMCTL" daemon-reload || echo "Warning: systemctl daemon-reload failed"
else
    echo "Warning: $SYSTEMCTL not found, skipping daemon-reload"
fi

echo ""
echo "@PROJECT_NAME@ installed."
echo "  Run:            @LAUNCHER@ --help"
echo "  Enable service: systemctl enable --now @SERVICE_NAME@"
echo "  Uninstall:      sudo $INSTALL_DIR/uninstall.sh"
"#;

pub fn render(info: &BundleInfo) -> Result<String> {
    info.render(TEMPLATE)
}
