/// Ordered buffer that stops accepting items once `capacity` is reached.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedVec<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> BoundedVec<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    /// Returns `false` and drops `item` when the buffer is full.
    pub fn try_push(&mut self, item: T) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.items.last_mut()
    }

    /// Empties the buffer, returning its items in insertion order.
    pub fn take(&mut self) -> Vec<T> {
        std::mem::take(&mut self.items)
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}
