//! Declarative selector tables for the virtuals profile markup.
//!
//! Each scalar field carries an ordered list of CSS selector candidates;
//! the first candidate that yields non-empty trimmed text wins. The lists
//! start with the original markup's class names and fall back to newer
//! data-role / semantic variants, tolerating markup drift without code
//! changes.

/// Agent display name. The only mandatory field.
pub const NAME: &[&str] = &[
    ".agent-name",
    "h1[data-role='agent-name']",
    ".profile-header h1",
    "h1",
];

/// Token price as rendered (free-form text, may include currency glyphs).
pub const PRICE: &[&str] = &[
    ".agent-price",
    "[data-role='token-price']",
    ".token-price .value",
    ".price",
];

/// Profile bio / description.
pub const DESCRIPTION: &[&str] = &[
    ".agent-description",
    "[data-role='agent-bio']",
    ".profile-bio",
    ".description",
];

/// Free-form stats blob.
pub const STATS: &[&str] = &[
    ".agent-stats",
    "[data-role='agent-stats']",
    ".profile-stats",
];

/// A labeled metric section: container candidates plus the row/label/value
/// selectors used to walk its child blocks.
pub struct SectionSpec {
    pub containers: &'static [&'static str],
    pub rows: &'static str,
    pub label: &'static str,
    pub value: &'static str,
}

/// Influence (social reach) section.
pub const INFLUENCE_SECTION: SectionSpec = SectionSpec {
    containers: &[
        ".influence-metrics",
        "[data-section='influence']",
        "section.influence",
    ],
    rows: ".metric-item",
    label: ".metric-label",
    value: ".metric-value",
};

/// Token market data section.
pub const TOKEN_SECTION: SectionSpec = SectionSpec {
    containers: &[
        ".token-data",
        "[data-section='token']",
        "section.token-metrics",
    ],
    rows: ".token-item",
    label: ".token-label",
    value: ".token-value",
};

/// Influence fields addressable from a block label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfluenceField {
    Mindshare,
    Impressions,
    Engagement,
    Followers,
    SmartFollowers,
    TopTweets,
}

/// Token fields addressable from a block label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenField {
    McFdv,
    Change24h,
    Tvl,
    Holders,
    Volume24h,
    Inferences,
}

/// Label text (lowercased) to influence field. Unmapped labels are ignored.
pub const INFLUENCE_LABELS: &[(&str, InfluenceField)] = &[
    ("mindshare", InfluenceField::Mindshare),
    ("impressions", InfluenceField::Impressions),
    ("engagement", InfluenceField::Engagement),
    ("followers", InfluenceField::Followers),
    ("smart followers", InfluenceField::SmartFollowers),
    ("top tweets", InfluenceField::TopTweets),
];

/// Label text (lowercased) to token field. The upstream app has renamed
/// several of these headings over time, hence the synonyms.
pub const TOKEN_LABELS: &[(&str, TokenField)] = &[
    ("mc/fdv", TokenField::McFdv),
    ("mc / fdv", TokenField::McFdv),
    ("24h chg", TokenField::Change24h),
    ("change (24h)", TokenField::Change24h),
    ("tvl", TokenField::Tvl),
    ("holders", TokenField::Holders),
    ("24h vol", TokenField::Volume24h),
    ("volume (24h)", TokenField::Volume24h),
    ("inferences", TokenField::Inferences),
];
