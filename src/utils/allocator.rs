use serde::{Deserialize, Serialize};

/// Stable body handle with generation tracking to prevent stale references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct BodyId {
    index: u32,
    generation: u32,
}

impl BodyId {
    pub fn new(index: usize, generation: u32) -> Self {
        Self {
            index: index as u32,
            generation,
        }
    }

    pub fn from_index(index: u32) -> Self {
        Self::new(index as usize, 0)
    }

    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for BodyId {
    fn default() -> Self {
        Self {
            index: u32::MAX,
            generation: 0,
        }
    }
}

/// Generational arena that hands out stable ids while preventing
/// use-after-free. Owned by the world; there are no process-wide counters.
pub struct Arena<T> {
    items: Vec<Option<T>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }

    pub fn insert(&mut self, item: T) -> BodyId {
        if let Some(index) = self.free_list.pop() {
            let generation = self.generations[index];
            self.items[index] = Some(item);
            return BodyId::new(index, generation);
        }

        let index = self.items.len();
        self.items.push(Some(item));
        self.generations.push(0);
        BodyId::new(index, 0)
    }

    pub fn get(&self, id: BodyId) -> Option<&T> {
        if self.is_valid(id) {
            self.items.get(id.index()).and_then(|slot| slot.as_ref())
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut T> {
        if self.is_valid(id) {
            self.items.get_mut(id.index()).and_then(|slot| slot.as_mut())
        } else {
            None
        }
    }

    /// Disjoint mutable access to two slots, used for pairwise contact
    /// resolution. Returns `None` when the ids alias or are stale.
    pub fn get2_mut(&mut self, id_a: BodyId, id_b: BodyId) -> Option<(&mut T, &mut T)> {
        if id_a.index() == id_b.index() {
            return None;
        }
        if !self.is_valid(id_a) || !self.is_valid(id_b) {
            return None;
        }

        let (first, second, flipped) = if id_a.index() < id_b.index() {
            (id_a, id_b, false)
        } else {
            (id_b, id_a, true)
        };

        let (left, right) = self.items.split_at_mut(second.index());
        let first_slot = left.get_mut(first.index()).and_then(|slot| slot.as_mut())?;
        let second_slot = right.get_mut(0).and_then(|slot| slot.as_mut())?;

        if flipped {
            Some((second_slot, first_slot))
        } else {
            Some((first_slot, second_slot))
        }
    }

    pub fn remove(&mut self, id: BodyId) -> Option<T> {
        if !self.is_valid(id) {
            return None;
        }
        let slot = self.items.get_mut(id.index())?;
        if slot.is_some() {
            self.generations[id.index()] = self.generations[id.index()].wrapping_add(1);
            self.free_list.push(id.index());
        }
        slot.take()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter_map(|slot| slot.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut().filter_map(|slot| slot.as_mut())
    }

    pub fn ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.items.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref()
                .map(|_| BodyId::new(index, self.generations[index]))
        })
    }

    pub fn len(&self) -> usize {
        self.items.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_valid(&self, id: BodyId) -> bool {
        self.generations
            .get(id.index())
            .copied()
            .map(|gen| gen == id.generation())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_ids_are_rejected_after_removal() {
        let mut arena = Arena::new();
        let id = arena.insert(7);
        assert_eq!(arena.remove(id), Some(7));
        assert!(arena.get(id).is_none());

        let reused = arena.insert(9);
        assert_eq!(reused.index(), id.index());
        assert_ne!(reused.generation(), id.generation());
        assert!(arena.get(id).is_none());
        assert_eq!(arena.get(reused), Some(&9));
    }

    #[test]
    fn get2_mut_refuses_aliasing() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);
        assert!(arena.get2_mut(a, a).is_none());

        let (x, y) = arena.get2_mut(b, a).unwrap();
        assert_eq!((*x, *y), (2, 1));
    }
}
