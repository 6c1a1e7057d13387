//! Viewport intersection, measured in terminal rows.
//!
//! This is the terminal stand-in for a browser intersection observer: the
//! host reports, per frame, how much of each rendered entry overlaps the
//! viewport, and [`VisibilityWatcher`] turns those ratios into
//! "became intersecting" transitions.
use std::collections::HashSet;
use std::hash::Hash;

/// Default fraction of an entry that must be visible to count as intersecting.
pub const DEFAULT_THRESHOLD: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    /// Fraction of the entry's rows that must be inside the root, in `0.0..=1.0`.
    pub threshold: f32,
    /// Rows added above and below the viewport before measuring.
    pub root_margin: usize,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            root_margin: 0,
        }
    }
}

/// A half-open vertical range of rows: `[top, top + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub top: usize,
    pub height: usize,
}

impl Span {
    pub fn new(top: usize, height: usize) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> usize {
        self.top.saturating_add(self.height)
    }
}

/// Fraction of `element` inside `viewport` grown by `root_margin` rows on each side.
pub fn intersection_ratio(element: Span, viewport: Span, root_margin: usize) -> f32 {
    if element.height == 0 {
        return 0.0;
    }
    let root_top = viewport.top.saturating_sub(root_margin);
    let root_bottom = viewport.bottom().saturating_add(root_margin);
    let top = element.top.max(root_top);
    let bottom = element.bottom().min(root_bottom);
    if bottom <= top {
        0.0
    } else {
        (bottom - top) as f32 / element.height as f32
    }
}

/// Tracks which keys are intersecting and reports only the transitions into view.
#[derive(Debug, Clone)]
pub struct VisibilityWatcher<K> {
    options: ObserverOptions,
    intersecting: HashSet<K>,
}

impl<K: Eq + Hash + Clone> VisibilityWatcher<K> {
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            intersecting: HashSet::new(),
        }
    }

    pub fn options(&self) -> ObserverOptions {
        self.options
    }

    /// Feed the ratios measured this frame. Keys missing from `ratios` are
    /// treated as out of view. Returns keys that just became intersecting,
    /// in the order given.
    pub fn update<I>(&mut self, ratios: I) -> Vec<K>
    where
        I: IntoIterator<Item = (K, f32)>,
    {
        let mut now = HashSet::new();
        let mut entered = Vec::new();
        for (key, ratio) in ratios {
            if ratio > 0.0 && ratio >= self.options.threshold {
                if !self.intersecting.contains(&key) && !now.contains(&key) {
                    entered.push(key.clone());
                }
                now.insert(key);
            }
        }
        self.intersecting = now;
        entered
    }

    pub fn is_intersecting(&self, key: &K) -> bool {
        self.intersecting.contains(key)
    }

    /// Forget everything; the next update reports every visible key again.
    pub fn detach(&mut self) {
        self.intersecting.clear();
    }
}
