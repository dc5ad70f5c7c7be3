//! One-slot memo per router used to rehydrate default visibility.

/// Snapshot of a router captured when its branch was hidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheValue {
    /// The router was visible.
    Visible,
    /// The router was visible carrying this payload.
    Data(String),
    /// The router was visible at this stack rank.
    Order(i64),
    /// The router was hidden. Suppresses default re-showing.
    Hidden,
}

impl CacheValue {
    pub fn data(&self) -> Option<&str> {
        match self {
            CacheValue::Data(data) => Some(data),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cache {
    slot: Option<CacheValue>,
}

impl Cache {
    pub fn get(&self) -> Option<&CacheValue> {
        self.slot.as_ref()
    }

    /// Stores `value` unless a value is already held. Returns whether it was stored.
    pub fn set_if_empty(&mut self, value: CacheValue) -> bool {
        if self.slot.is_some() {
            return false;
        }
        self.slot = Some(value);
        true
    }

    /// Overwrites the slot with an explicit "was hidden".
    pub fn mark_hidden(&mut self) {
        self.slot = Some(CacheValue::Hidden);
    }

    /// Consumes the slot.
    pub fn take(&mut self) -> Option<CacheValue> {
        self.slot.take()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self.slot, Some(CacheValue::Hidden))
    }
}
