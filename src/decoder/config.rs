/// Option set handed to the symbol decoder for one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Short identifier used in logs and reports
    pub name: &'static str,
    /// Restrict recognition to QR symbols
    pub qr_only: bool,
    /// Spend more effort per image (e.g. decode every candidate grid)
    pub try_harder: bool,
    /// Required payload character set, if any
    pub character_set: Option<&'static str>,
    /// Retry with inverted polarity when the normal one fails
    pub also_inverted: bool,
    /// Treat the image as a clean, already-binary symbol
    pub pure_barcode: bool,
}

impl DecoderConfig {
    const BASE: DecoderConfig = DecoderConfig {
        name: "minimal",
        qr_only: true,
        try_harder: false,
        character_set: None,
        also_inverted: false,
        pure_barcode: false,
    };

    /// Thorough search with a UTF-8 payload requirement
    pub const TRY_HARDER_UTF8: DecoderConfig = DecoderConfig {
        name: "try_harder_utf8",
        try_harder: true,
        character_set: Some("UTF-8"),
        ..Self::BASE
    };

    /// Thorough search, any character set
    pub const TRY_HARDER: DecoderConfig = DecoderConfig {
        name: "try_harder",
        try_harder: true,
        ..Self::BASE
    };

    /// Cheapest attempt
    pub const MINIMAL: DecoderConfig = Self::BASE;

    /// Thorough search that also tries the inverted image
    pub const TRY_HARDER_INVERTED: DecoderConfig = DecoderConfig {
        name: "try_harder_inverted",
        try_harder: true,
        also_inverted: true,
        ..Self::BASE
    };

    /// Fast path for clean binary symbols
    pub const PURE_BARCODE: DecoderConfig = DecoderConfig {
        name: "pure_barcode",
        pure_barcode: true,
        ..Self::BASE
    };

    /// Clean-symbol path with the thorough search
    pub const PURE_BARCODE_TRY_HARDER: DecoderConfig = DecoderConfig {
        name: "pure_barcode_try_harder",
        pure_barcode: true,
        try_harder: true,
        ..Self::BASE
    };

    /// The fixed attempt order used by the strategy search
    pub const STRATEGIES: [DecoderConfig; 6] = [
        Self::TRY_HARDER_UTF8,
        Self::TRY_HARDER,
        Self::MINIMAL,
        Self::TRY_HARDER_INVERTED,
        Self::PURE_BARCODE,
        Self::PURE_BARCODE_TRY_HARDER,
    ];

    /// Whether a payload must be strict UTF-8
    pub fn requires_utf8(&self) -> bool {
        self.character_set
            .is_some_and(|cs| cs.eq_ignore_ascii_case("UTF-8") || cs.eq_ignore_ascii_case("UTF8"))
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::MINIMAL
    }
}
