// Generational arena used as the identity/lookup service for entities, hands and zones.

use super::ids::ArenaId;
use std::marker::PhantomData;

pub struct Arena<I, T> {
    slots: Vec<Option<T>>,
    generations: Vec<u32>,
    free_indices: Vec<usize>,
    _id: PhantomData<I>,
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaId, T> Arena<I, T> {
    pub fn new() -> Self {
        // Index 0 is the nil sentinel so the first real handle has index 1.
        Self {
            slots: vec![None],
            generations: vec![0],
            free_indices: Vec::new(),
            _id: PhantomData,
        }
    }

    /// Inserts a record built from its own handle.
    pub fn insert_with(&mut self, build: impl FnOnce(I) -> T) -> I {
        if let Some(index) = self.free_indices.pop() {
            let id = I::from_parts(index as u32, self.generations[index]);
            self.slots[index] = Some(build(id));
            return id;
        }

        let index = self.slots.len();
        let id = I::from_parts(index as u32, 0);
        self.slots.push(Some(build(id)));
        self.generations.push(0);
        id
    }

    /// Same as [`Arena::insert_with`] but the builder may refuse.
    pub fn try_insert_with<E>(&mut self, build: impl FnOnce(I) -> Result<T, E>) -> Result<I, E> {
        let (index, generation) = match self.free_indices.last() {
            Some(&index) => (index, self.generations[index]),
            None => (self.slots.len(), 0),
        };
        let id = I::from_parts(index as u32, generation);
        let record = build(id)?;

        if index == self.slots.len() {
            self.slots.push(Some(record));
            self.generations.push(0);
        } else {
            self.free_indices.pop();
            self.slots[index] = Some(record);
        }
        Ok(id)
    }

    fn slot(&self, id: I) -> Option<usize> {
        let index = id.index() as usize;
        if index == 0 || index >= self.slots.len() || self.generations[index] != id.generation() {
            return None;
        }
        Some(index)
    }

    pub fn get(&self, id: I) -> Option<&T> {
        self.slot(id).and_then(|index| self.slots[index].as_ref())
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.slot(id).and_then(|index| self.slots[index].as_mut())
    }

    pub fn contains(&self, id: I) -> bool {
        self.get(id).is_some()
    }

    /// Removes a record and bumps the slot generation.
    pub fn remove(&mut self, id: I) -> Option<T> {
        let index = self.slot(id)?;
        let record = self.slots[index].take()?;
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.free_indices.push(index);
        Some(record)
    }

    /// Removes every record. Generations keep counting, so no earlier handle resolves again.
    pub fn clear(&mut self) {
        for index in 1..self.slots.len() {
            if self.slots[index].take().is_some() {
                self.generations[index] = self.generations[index].wrapping_add(1);
                self.free_indices.push(index);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of live handles, in slot order. Callers iterate this while mutating the arena.
    pub fn ids(&self) -> Vec<I> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(move |(index, slot)| {
            slot.as_ref()
                .map(|record| (I::from_parts(index as u32, self.generations[index]), record))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (I, &mut T)> + '_ {
        let generations = &self.generations;
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(move |(index, slot)| {
                slot.as_mut()
                    .map(|record| (I::from_parts(index as u32, generations[index]), record))
            })
    }
}
