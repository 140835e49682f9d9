//! Options for resting and treasure conversion.

/// Options for a rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestOptions {
    /// Hours rested.
    pub hours: u32,
    /// Provisions supplied by magic, subtracted from consumption.
    pub magical_provisions: i64,
    /// Whether linked traveler actors rest as well.
    pub rest_travelers: bool,
    /// Whether daily uses are restored.
    pub restore_daily_uses: bool,
}

impl Default for RestOptions {
    fn default() -> Self {
        Self {
            hours: 12,
            magical_provisions: 0,
            rest_travelers: true,
            restore_daily_uses: true,
        }
    }
}

impl RestOptions {
    /// Set the hours rested.
    pub fn with_hours(mut self, hours: u32) -> Self {
        self.hours = hours;
        self
    }

    /// Set the magical provisions (never negative).
    pub fn with_magical_provisions(mut self, provisions: i64) -> Self {
        self.magical_provisions = provisions.max(0);
        self
    }

    /// Set whether linked travelers rest too.
    pub fn with_rest_travelers(mut self, rest: bool) -> Self {
        self.rest_travelers = rest;
        self
    }

    /// Set whether daily uses are restored.
    pub fn with_restore_daily_uses(mut self, restore: bool) -> Self {
        self.restore_daily_uses = restore;
        self
    }
}

/// Options for converting treasure to coin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Remove sold treasure instead of zeroing its quantity.
    pub delete: bool,
    /// Pay out platinum as well as gold.
    pub use_platinum: bool,
}

impl ConvertOptions {
    /// Set whether sold treasure is removed.
    pub fn with_delete(mut self, delete: bool) -> Self {
        self.delete = delete;
        self
    }

    /// Set whether platinum is paid out.
    pub fn with_platinum(mut self, use_platinum: bool) -> Self {
        self.use_platinum = use_platinum;
        self
    }
}
