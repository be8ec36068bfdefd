use std::collections::HashMap;

/// Surrogate key handed out by [`IdAssigner`]. Always starts at 1.
pub type SurrogateId = u32;

/// Hands out sequential surrogate keys and remembers which key each natural
/// key received.
///
/// Keys are assigned in call order, so the caller's iteration order is the
/// id order. Callers feed deduplicated keys; if a key repeats anyway, the map
/// keeps its first id.
#[derive(Debug, Default)]
pub struct IdAssigner {
    next: SurrogateId,
    map: HashMap<String, SurrogateId>,
}

impl IdAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id and records it for `key`.
    pub fn assign(&mut self, key: &str) -> SurrogateId {
        self.next += 1;
        self.map.entry(key.to_string()).or_insert(self.next);
        self.next
    }

    pub fn finish(self) -> IdMap {
        IdMap { map: self.map }
    }
}

/// Read-only lookup from natural key to surrogate id, threaded from the
/// exporter that built it to the exporters that reference it.
#[derive(Debug, Default, Clone)]
pub struct IdMap {
    map: HashMap<String, SurrogateId>,
}

impl IdMap {
    pub fn get(&self, key: &str) -> Option<SurrogateId> {
        self.map.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
impl FromIterator<(&'static str, SurrogateId)> for IdMap {
    fn from_iter<I: IntoIterator<Item = (&'static str, SurrogateId)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }
}
