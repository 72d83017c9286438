pub mod catalog;
pub mod error;
pub mod format;
pub mod jewels;
pub mod pipeline;
pub mod pool;
pub mod query;
pub mod search;
pub mod signature;
pub mod split;

/// Skill identifier as used throughout the catalog and query.
pub type SkillId = u16;
/// Raw point contribution of a piece/jewel to a skill; may be negative.
pub type Points = i32;
/// Identifier of an armor piece within the catalog.
pub type ArmorId = u32;
/// Identifier of a jewel within the catalog.
pub type JewelId = u32;

/// Number of skills the foundation forest tracks before any splitting
/// occurs. Grouping quality degrades quickly past this width, so only the
/// two cheapest-to-satisfy effects are folded into the foundation key.
pub const FOUNDATION_NUM: usize = 2;

/// Largest jewel/socket size in the catalog (sockets are 1..=3).
pub const MAX_SOCKET_SIZE: u8 = 3;

/// Armor body slots plus the synthetic amulet slot, in the fixed order
/// pieces are folded into the foundation forest. The amulet is merged in
/// last of all, and the body slot (merged second-to-last, just before the
/// amulet) is the only one whose merge step invokes
/// [`signature::Signature::body_refactor`] on everything accumulated so
/// far — see `pipeline::foundation` for why that ordering matters.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ArmorPart {
    Head,
    Hands,
    Waist,
    Feet,
    Body,
    Amulet,
}

impl ArmorPart {
    /// Merge order: the four non-body, non-amulet slots fold together
    /// first (order among these is irrelevant), then the body slot
    /// refactors and folds in, then the amulet slot folds in last and
    /// unscaled.
    pub const ALL: [ArmorPart; 6] = [
        ArmorPart::Head,
        ArmorPart::Hands,
        ArmorPart::Waist,
        ArmorPart::Feet,
        ArmorPart::Body,
        ArmorPart::Amulet,
    ];

    pub const COUNT: usize = 6;

    /// The five slots an `ArmorPiece` can actually occupy (excludes the
    /// synthetic amulet slot, which is populated from `Query::amulets`
    /// instead of the piece catalog).
    pub const BODY_SLOTS: [ArmorPart; 5] = [
        ArmorPart::Head,
        ArmorPart::Hands,
        ArmorPart::Waist,
        ArmorPart::Feet,
        ArmorPart::Body,
    ];

    pub fn index(self) -> usize {
        match self {
            ArmorPart::Head => 0,
            ArmorPart::Hands => 1,
            ArmorPart::Waist => 2,
            ArmorPart::Feet => 3,
            ArmorPart::Body => 4,
            ArmorPart::Amulet => 5,
        }
    }

    pub fn is_body(self) -> bool {
        matches!(self, ArmorPart::Body)
    }

    pub fn is_amulet(self) -> bool {
        matches!(self, ArmorPart::Amulet)
    }
}

impl std::fmt::Display for ArmorPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ArmorPart::Head => "HEAD",
            ArmorPart::Body => "BODY",
            ArmorPart::Hands => "ARMS",
            ArmorPart::Waist => "LEGS",
            ArmorPart::Feet => "FEET",
            ArmorPart::Amulet => "AMULET",
        };
        write!(f, "{name}")
    }
}

/// Initializes combined terminal logging for the search/explore binaries.
///
/// Mirrors the teacher's `simplelog`-backed `init()`, minus the background
/// ctrl-c shutdown hook: this crate is single-threaded and cooperative, with
/// no worker task to signal.
pub fn init_logging(verbosity: log::LevelFilter) {
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let term = simplelog::TermLogger::new(
        verbosity,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    let _ = simplelog::CombinedLogger::init(vec![term]);
}
