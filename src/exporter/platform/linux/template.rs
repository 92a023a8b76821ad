//! Default installer script run by the self-extracting archive.

pub const GNU_SETUP_SCRIPT: &str = r#"#!/bin/sh
# {{project_name}} installer, {{company_name}}
set -e

PROJECT="{{project_name}}"
LEGACY={{legacy}}
SUFFIX=""

if [ "$LEGACY" = "1" ] && ! grep -q -w avx /proc/cpuinfo 2>/dev/null; then
    echo "CPU without AVX support detected, installing legacy build."
    SUFFIX=" (L)"
fi

# DESTDIR relocates the whole install, as with make install.
if [ "$(id -u)" = "0" ]; then
    BIN_DIR="$DESTDIR/usr/local/bin"
    VST_DIR="$DESTDIR/usr/local/lib/vst"
    VST3_DIR="$DESTDIR/usr/local/lib/vst3"
    DOC_DIR="$DESTDIR/usr/local/share/doc/{{company_name}}"
else
    BIN_DIR="$DESTDIR$HOME/.local/bin"
    VST_DIR="$DESTDIR$HOME/.vst"
    VST3_DIR="$DESTDIR$HOME/.vst3"
    DOC_DIR="$DESTDIR$HOME/.local/share/doc/{{company_name}}"
fi

# install_file <source> <directory> [<installed name>]
install_file() {
    if [ -e "$1" ]; then
        name="$3"
        if [ -z "$name" ]; then
            name="$(basename "$1" | sed 's/ (L)//')"
        fi
        mkdir -p "$2"
        rm -rf "$2/$name"
        cp -r "$1" "$2/$name"
        echo "Installed $(basename "$1") to $2/$name"
    fi
}

for candidate in "$PROJECT$SUFFIX" "$PROJECT (IPP)$SUFFIX"; do
    standalone="$(echo "$candidate" | sed 's/ (L)//')"
    install_file "./$candidate.run" "$BIN_DIR" "$standalone"
    if [ -e "$BIN_DIR/$standalone" ]; then
        chmod +x "$BIN_DIR/$standalone"
    fi
    install_file "./$candidate.so" "$VST_DIR"
    install_file "./$candidate.vst3" "$VST3_DIR"
done

if [ -e "./$PROJECT User Manual.pdf" ]; then
    install_file "./$PROJECT User Manual.pdf" "$DOC_DIR"
fi

echo "$PROJECT installation complete."
"#;
