use core::ops::Range;

use crate::stage::StageError;

use super::DrawableId;

/// A named contiguous segment of the draw list.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LayerGroup {
    name: String,
    /// Index of the group's first slot in `DrawList::ids`.
    offset: usize,
}

/// Global paint order, partitioned into layer groups.
///
/// Ids are stored back-to-front in a single vector. Each group owns one
/// contiguous range of it, starting at its recorded offset and ending where the
/// next group starts. Group order is fixed once set.
///
/// Performance characteristics:
/// - insert/remove/reorder are O(n) in the draw list length (slice shifts)
/// - group lookup is O(g) in the number of groups, which is small
#[derive(Debug, Default, Clone)]
pub struct DrawList {
    ids: Vec<DrawableId>,
    groups: Vec<LayerGroup>,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines the layer groups, back to front.
    ///
    /// Only allowed while the list is empty; duplicate names are rejected.
    pub fn set_groups<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), StageError> {
        if !self.ids.is_empty() {
            return Err(StageError::LayerGroupsInUse);
        }
        let mut groups: Vec<LayerGroup> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            if groups.iter().any(|g| g.name == name) {
                return Err(StageError::DuplicateLayerGroup(name.to_string()));
            }
            groups.push(LayerGroup { name: name.to_string(), offset: 0 });
        }
        self.groups = groups;
        Ok(())
    }

    /// Group names, back to front.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    /// All ids, back to front.
    #[inline]
    pub fn ids(&self) -> &[DrawableId] {
        &self.ids
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Absolute index of `id`, if present.
    pub fn order_of(&self, id: DrawableId) -> Option<usize> {
        self.ids.iter().position(|&i| i == id)
    }

    /// Slot range occupied by `group`.
    pub fn group_range(&self, group: &str) -> Option<Range<usize>> {
        let index = self.group_index(group)?;
        Some(self.range_of(index))
    }

    /// Appends `id` at the front of `group` (last in paint order within it).
    pub fn insert(&mut self, id: DrawableId, group: &str) -> Result<(), StageError> {
        let index = self
            .group_index(group)
            .ok_or_else(|| StageError::UnknownLayerGroup(group.to_string()))?;
        let end = self.range_of(index).end;
        self.ids.insert(end, id);
        self.shift_after(index, 1);
        Ok(())
    }

    /// Removes `id` from `group`. Returns `false` if it is not in that group's range.
    pub fn remove(&mut self, id: DrawableId, group: &str) -> bool {
        let Some(index) = self.group_index(group) else { return false };
        let range = self.range_of(index);
        let Some(pos) = self.ids[range.clone()].iter().position(|&i| i == id) else {
            return false;
        };
        self.ids.remove(range.start + pos);
        self.shift_after(index, -1);
        true
    }

    /// Moves `id` within `group`.
    ///
    /// `order` is an index within the group, or an offset from the current index
    /// when `relative` is set. `min_order` (an index within the group) floors the
    /// result only when it falls inside the group; the result is then clamped to
    /// the group. Returns the new absolute index, as [`order_of`](Self::order_of)
    /// reports it, or `None` (leaving the list unchanged) when `id` is not in the
    /// group.
    pub fn set_order(
        &mut self,
        id: DrawableId,
        order: i64,
        group: &str,
        relative: bool,
        min_order: Option<usize>,
    ) -> Option<usize> {
        let index = self.group_index(group)?;
        let range = self.range_of(index);
        let current = self.ids[range.clone()].iter().position(|&i| i == id)?;

        let len = range.len() as i64;
        let mut target = if relative { current as i64 + order } else { order };
        if let Some(min) = min_order.filter(|&m| (m as i64) < len) {
            target = target.max(min as i64);
        }
        let target = target.clamp(0, len - 1) as usize;

        let start = range.start;
        let slots = &mut self.ids[range];
        if target < current {
            slots[target..=current].rotate_right(1);
        } else if target > current {
            slots[current..=target].rotate_left(1);
        }
        Some(start + target)
    }

    /// Checks the partition invariant: offsets are monotonic, start at zero and
    /// stay within the list.
    pub fn is_consistent(&self) -> bool {
        let mut prev = 0;
        for (i, g) in self.groups.iter().enumerate() {
            if (i == 0 && g.offset != 0) || g.offset < prev || g.offset > self.ids.len() {
                return false;
            }
            prev = g.offset;
        }
        // Without groups nothing can be inserted.
        !self.groups.is_empty() || self.ids.is_empty()
    }

    fn group_index(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.name == name)
    }

    fn range_of(&self, index: usize) -> Range<usize> {
        let start = self.groups[index].offset;
        let end = self
            .groups
            .get(index + 1)
            .map_or(self.ids.len(), |next| next.offset);
        start..end
    }

    fn shift_after(&mut self, index: usize, delta: isize) {
        for g in &mut self.groups[index + 1..] {
            g.offset = g.offset.wrapping_add_signed(delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(v: u32) -> DrawableId {
        DrawableId::new(v)
    }

    fn list() -> DrawList {
        let mut l = DrawList::new();
        l.set_groups(&["background", "video", "pen", "sprite"]).unwrap();
        l
    }

    fn group_ids(l: &DrawList, group: &str) -> Vec<u32> {
        let r = l.group_range(group).unwrap();
        l.ids()[r].iter().map(|i| i.get()).collect()
    }

    // ── groups ────────────────────────────────────────────────────────────

    #[test]
    fn duplicate_groups_rejected() {
        let mut l = DrawList::new();
        let err = l.set_groups(&["a", "b", "a"]).unwrap_err();
        assert_eq!(err, StageError::DuplicateLayerGroup("a".into()));
    }

    #[test]
    fn groups_fixed_once_populated() {
        let mut l = list();
        l.insert(id(1), "sprite").unwrap();
        assert_eq!(l.set_groups(&["x"]), Err(StageError::LayerGroupsInUse));
    }

    #[test]
    fn unknown_group_insert_fails() {
        let mut l = list();
        assert_eq!(
            l.insert(id(1), "nope"),
            Err(StageError::UnknownLayerGroup("nope".into()))
        );
        assert!(l.is_empty());
    }

    // ── insert / remove ───────────────────────────────────────────────────

    #[test]
    fn insert_appends_within_group_and_shifts_later_groups() {
        let mut l = list();
        l.insert(id(1), "sprite").unwrap();
        l.insert(id(2), "background").unwrap();
        l.insert(id(3), "pen").unwrap();
        l.insert(id(4), "sprite").unwrap();
        l.insert(id(5), "background").unwrap();

        let order: Vec<u32> = l.ids().iter().map(|i| i.get()).collect();
        assert_eq!(order, vec![2, 5, 3, 1, 4]);
        assert_eq!(l.group_range("video"), Some(2..2));
        assert_eq!(group_ids(&l, "sprite"), vec![1, 4]);
        assert!(l.is_consistent());
    }

    #[test]
    fn remove_only_from_named_group() {
        let mut l = list();
        l.insert(id(1), "pen").unwrap();
        l.insert(id(2), "sprite").unwrap();

        assert!(!l.remove(id(2), "pen"));
        assert_eq!(l.len(), 2);

        assert!(l.remove(id(1), "pen"));
        assert_eq!(group_ids(&l, "sprite"), vec![2]);
        assert_eq!(l.group_range("sprite"), Some(0..1));
        assert!(l.is_consistent());
    }

    // ── set_order ─────────────────────────────────────────────────────────

    fn sprites() -> DrawList {
        let mut l = list();
        l.insert(id(100), "pen").unwrap();
        for v in 1..=4 {
            l.insert(id(v), "sprite").unwrap();
        }
        l
    }

    #[test]
    fn absolute_order_moves_within_group() {
        let mut l = sprites();
        assert_eq!(l.set_order(id(4), 0, "sprite", false, None), Some(1));
        assert_eq!(group_ids(&l, "sprite"), vec![4, 1, 2, 3]);
        assert_eq!(group_ids(&l, "pen"), vec![100]);
    }

    #[test]
    fn absolute_order_clamps_to_group() {
        let mut l = sprites();
        assert_eq!(l.set_order(id(1), 99, "sprite", false, None), Some(4));
        assert_eq!(group_ids(&l, "sprite"), vec![2, 3, 4, 1]);
        assert_eq!(l.set_order(id(1), -5, "sprite", false, None), Some(1));
        assert_eq!(group_ids(&l, "sprite"), vec![1, 2, 3, 4]);
    }

    #[test]
    fn relative_order_steps_from_current() {
        let mut l = sprites();
        assert_eq!(l.set_order(id(2), 1, "sprite", true, None), Some(3));
        assert_eq!(group_ids(&l, "sprite"), vec![1, 3, 2, 4]);
        assert_eq!(l.set_order(id(2), -10, "sprite", true, None), Some(1));
        assert_eq!(group_ids(&l, "sprite"), vec![2, 1, 3, 4]);
    }

    #[test]
    fn min_order_floors_the_result() {
        let mut l = sprites();
        assert_eq!(l.set_order(id(3), 0, "sprite", false, Some(1)), Some(2));
        assert_eq!(group_ids(&l, "sprite"), vec![1, 3, 2, 4]);
    }

    #[test]
    fn min_order_past_the_group_is_ignored() {
        let mut l = sprites();
        assert_eq!(l.set_order(id(3), 0, "sprite", false, Some(10)), Some(1));
        assert_eq!(group_ids(&l, "sprite"), vec![3, 1, 2, 4]);
        assert_eq!(l.set_order(id(3), 10, "sprite", false, Some(4)), Some(4));
        assert_eq!(group_ids(&l, "sprite"), vec![1, 2, 4, 3]);
    }

    #[test]
    fn returned_order_matches_order_of() {
        let mut l = sprites();
        for (v, order, relative) in [(2, 0, false), (1, 2, true), (4, -1, true), (3, 7, false)] {
            let got = l.set_order(id(v), order, "sprite", relative, None);
            assert_eq!(got, l.order_of(id(v)));
        }
    }

    #[test]
    fn missing_id_returns_none_and_leaves_list() {
        let mut l = sprites();
        let before = l.ids().to_vec();
        assert_eq!(l.set_order(id(100), 0, "sprite", false, None), None);
        assert_eq!(l.set_order(id(999), 0, "sprite", false, None), None);
        assert_eq!(l.set_order(id(1), 0, "nope", false, None), None);
        assert_eq!(l.ids(), &before[..]);
    }

    // ── invariant ─────────────────────────────────────────────────────────

    #[test]
    fn contiguity_holds_through_mixed_operations() {
        let groups = ["background", "video", "pen", "sprite"];
        let mut l = list();
        let mut members: Vec<(u32, &str)> = Vec::new();

        // Deterministic pseudo-random walk over inserts, removes and reorders.
        let mut seed = 0x2545_f491_u32;
        let mut next = || {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            seed
        };

        for step in 1..=300u32 {
            let r = next();
            match r % 3 {
                0 | 1 if members.len() < 40 => {
                    let g = groups[(next() % 4) as usize];
                    l.insert(id(step), g).unwrap();
                    members.push((step, g));
                }
                0 if !members.is_empty() => {
                    let (v, g) = members.remove((next() as usize) % members.len());
                    assert!(l.remove(id(v), g));
                }
                _ if !members.is_empty() => {
                    let (v, g) = members[(next() as usize) % members.len()];
                    let order = (next() % 9) as i64 - 4;
                    let relative = next() % 2 == 0;
                    assert!(l.set_order(id(v), order, g, relative, None).is_some());
                }
                _ => {}
            }

            assert!(l.is_consistent());
            assert_eq!(l.len(), members.len());
            for &(v, g) in &members {
                let r = l.group_range(g).unwrap();
                assert!(l.ids()[r].contains(&id(v)), "{v} escaped group {g}");
            }
        }
    }
}
