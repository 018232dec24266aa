use crate::{
    assets::ImageBuf,
    error::{ForgeError, ForgeResult},
};

/// One composed meme: the source image, its two captions, and the flattened
/// output.
///
/// Immutable once created; an edit produces a brand-new value that replaces
/// the old one at the same position. Identity is positional.
#[derive(Clone, Debug)]
pub struct Meme {
    pub top_text: String,
    pub bottom_text: String,
    /// The un-captioned source image, kept for edit-in-place.
    pub original: ImageBuf,
    /// The flattened image handed to the share surface.
    pub rendered: ImageBuf,
}

/// Ordered collection of composed memes.
///
/// Insertion order is the display order; indices are always contiguous
/// `0..len`. A single owned instance is passed by handle to every display
/// surface; there is no change-notification channel, so surfaces re-read
/// the store whenever control returns to them.
#[derive(Debug, Default)]
pub struct MemeStore {
    memes: Vec<Meme>,
}

impl MemeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.memes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Meme> {
        self.memes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Meme> {
        self.memes.iter()
    }

    /// Add a meme at the end of the collection.
    pub fn append(&mut self, meme: Meme) {
        tracing::debug!(index = self.memes.len(), "meme appended");
        self.memes.push(meme);
    }

    /// Replace the meme at `index` with a new value.
    ///
    /// Implemented as remove-then-insert; the net effect is an in-place
    /// replace with identical positional semantics.
    pub fn replace(&mut self, meme: Meme, index: usize) -> ForgeResult<()> {
        self.check_index(index)?;
        self.memes.remove(index);
        self.memes.insert(index, meme);
        tracing::debug!(index, "meme replaced");
        Ok(())
    }

    /// Delete the meme at `index`; later indices shift down by one.
    pub fn remove_at(&mut self, index: usize) -> ForgeResult<Meme> {
        self.check_index(index)?;
        tracing::debug!(index, "meme removed");
        Ok(self.memes.remove(index))
    }

    /// Move the meme at `from` so it ends up at `to`; intervening elements
    /// shift accordingly.
    pub fn move_item(&mut self, from: usize, to: usize) -> ForgeResult<()> {
        self.check_index(from)?;
        if to >= self.memes.len() {
            return Err(ForgeError::validation(format!(
                "destination index {to} out of range (have {})",
                self.memes.len()
            )));
        }
        let meme = self.memes.remove(from);
        self.memes.insert(to, meme);
        tracing::debug!(from, to, "meme moved");
        Ok(())
    }

    fn check_index(&self, index: usize) -> ForgeResult<()> {
        if index >= self.memes.len() {
            return Err(ForgeError::validation(format!(
                "meme index {index} out of range (have {})",
                self.memes.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meme(tag: &str) -> Meme {
        let image = ImageBuf::solid(1, 1, [9, 9, 9, 255]).unwrap();
        Meme {
            top_text: tag.to_string(),
            bottom_text: String::new(),
            original: image.clone(),
            rendered: image,
        }
    }

    fn store_with(tags: &[&str]) -> MemeStore {
        let mut store = MemeStore::new();
        for tag in tags {
            store.append(meme(tag));
        }
        store
    }

    fn tags(store: &MemeStore) -> Vec<String> {
        store.iter().map(|m| m.top_text.clone()).collect()
    }

    #[test]
    fn append_keeps_insertion_order() {
        let store = store_with(&["A", "B", "C"]);
        assert_eq!(tags(&store), ["A", "B", "C"]);
    }

    #[test]
    fn replace_preserves_length_and_neighbors() {
        let mut store = store_with(&["A", "B", "C"]);
        store.replace(meme("B2"), 1).unwrap();
        assert_eq!(tags(&store), ["A", "B2", "C"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn remove_shifts_later_indices_down() {
        let mut store = store_with(&["A", "B", "C"]);
        let removed = store.remove_at(1).unwrap();
        assert_eq!(removed.top_text, "B");
        assert_eq!(tags(&store), ["A", "C"]);
    }

    #[test]
    fn remove_then_move_worked_example() {
        let mut store = store_with(&["A", "B", "C"]);
        store.remove_at(1).unwrap();
        assert_eq!(tags(&store), ["A", "C"]);
        store.move_item(0, 1).unwrap();
        assert_eq!(tags(&store), ["C", "A"]);
    }

    #[test]
    fn move_preserves_the_multiset() {
        let mut store = store_with(&["A", "B", "C", "D"]);
        store.move_item(3, 0).unwrap();
        assert_eq!(tags(&store), ["D", "A", "B", "C"]);
        store.move_item(0, 3).unwrap();
        assert_eq!(tags(&store), ["A", "B", "C", "D"]);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let mut store = store_with(&["A"]);
        assert!(store.replace(meme("X"), 1).is_err());
        assert!(store.remove_at(1).is_err());
        assert!(store.move_item(0, 1).is_err());
        assert!(store.move_item(1, 0).is_err());
        assert_eq!(tags(&store), ["A"]);
    }
}
