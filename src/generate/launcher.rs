//! Launcher script: runs the bundled node against the application entry.

use anyhow::Result;

use super::BundleInfo;

const TEMPLATE: &str = r#"#!/bin/sh
# @PROJECT_NAME@ @PROJECT_VERSION@ (Node.js v@NODE_VERSION@, linux-@ARCH@)
set -e

# Resolve through the /usr/local/bin symlink to the bundle directory.
SELF="$(readlink -f "$0")"
BASE_DIR="$(cd "$(dirname "$SELF")" && pwd)"

export NODE_ENV=production
export PATH="$BASE_DIR/nodejs/bin:$PATH"

exec "$BASE_DIR/nodejs/bin/node" "$BASE_DIR/app/@ENTRY_POINT@" "$@"
"#;

pub fn render(info: &BundleInfo) -> Result<String> {
    info.render(TEMPLATE)
}
