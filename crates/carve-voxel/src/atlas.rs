use std::collections::HashMap;

/// Opaque texture/atlas service consumed while compiling type definitions.
/// Meshing itself only ever sees the resolved integer slice indices.
pub trait TextureAtlas {
    /// Registers (or finds) the image at `path` and returns its slice index,
    /// or `None` if the atlas cannot place it.
    fn register_texture(&mut self, path: &str) -> Option<i32>;
}

/// Atlas stub that hands out sequential slice indices per unique path.
/// Useful for tests and headless tools where no real atlas exists.
#[derive(Default, Debug)]
pub struct SequentialAtlas {
    by_path: HashMap<String, i32>,
}

impl SequentialAtlas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}

impl TextureAtlas for SequentialAtlas {
    fn register_texture(&mut self, path: &str) -> Option<i32> {
        let next = self.by_path.len() as i32;
        Some(*self.by_path.entry(path.to_string()).or_insert(next))
    }
}
