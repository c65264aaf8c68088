/// Curated nerd font glyphs used by rigup's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NerdFont {
    Check,    //
    Cross,    //
    Warning,  //
    Info,     //
    Download, //
    Archive,  //
    Package,  //
    Globe,    //
}

impl NerdFont {
    pub fn glyph(self) -> char {
        match self {
            Self::Check => '\u{f00c}',    // fa-check
            Self::Cross => '\u{f00d}',    // fa-times
            Self::Warning => '\u{f071}',  // fa-exclamation-triangle
            Self::Info => '\u{f05a}',     // fa-info-circle
            Self::Download => '\u{f019}', // fa-download
            Self::Archive => '\u{f187}',  // fa-archive
            Self::Package => '\u{f187}',  // fa-archive (reused)
            Self::Globe => '\u{f0ac}',    // fa-globe
        }
    }
}

impl From<NerdFont> for char {
    fn from(icon: NerdFont) -> char {
        icon.glyph()
    }
}
