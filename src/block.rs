use crate::{evaluate_palette, Color16, Decoder};

/// A compressed BC1 (DXT1) block.
///
/// The block covers 4x4 pixels. Each pixel selects one of 4 palette entries
/// derived from the two endpoints. If `color0 > color1` (as packed 16-bit
/// values) the block is in 4-color mode, otherwise it is in 3-color mode and
/// index 3 denotes transparent black.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockDxt1 {
    pub color0: Color16,
    pub color1: Color16,
    /// 2 bits per pixel, pixel `i` (row-major) at bit offset `2 * i`.
    pub indices: u32,
}
impl BlockDxt1 {
    pub const fn new(color0: Color16, color1: Color16, indices: u32) -> Self {
        Self {
            color0,
            color1,
            indices,
        }
    }

    /// Returns whether the block uses the 4-color (opaque) palette.
    pub fn is_four_color(&self) -> bool {
        self.color0 > self.color1
    }

    /// Returns the palette index of the pixel at `pixel_index` (`0..16`).
    pub fn index(&self, pixel_index: usize) -> u8 {
        IndexList::from(self.indices).get(pixel_index)
    }

    /// Serializes the block into its 8-byte little-endian wire format.
    pub fn to_bytes(&self) -> [u8; 8] {
        let c0 = self.color0.to_u16().to_le_bytes();
        let c1 = self.color1.to_u16().to_le_bytes();
        let [i0, i1, i2, i3] = self.indices.to_le_bytes();

        [c0[0], c0[1], c1[0], c1[1], i0, i1, i2, i3]
    }
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self {
            color0: Color16::from_u16(u16::from_le_bytes([bytes[0], bytes[1]])),
            color1: Color16::from_u16(u16::from_le_bytes([bytes[2], bytes[3]])),
            indices: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }

    /// Emulates how the given decoder reconstructs the 16 RGBA pixels.
    ///
    /// Index 3 in 3-color mode decodes to transparent black `[0, 0, 0, 0]`.
    pub fn decode(&self, decoder: Decoder) -> [[u8; 4]; 16] {
        let palette = evaluate_palette(self.color0, self.color1, decoder);
        let four_color = self.is_four_color();
        let lut: [[u8; 4]; 4] = std::array::from_fn(|i| {
            let [r, g, b] = palette[i];
            let a = if i == 3 && !four_color { 0 } else { 255 };
            [r, g, b, a]
        });

        let indexes = IndexList::from(self.indices);
        std::array::from_fn(|i| lut[indexes.get(i) as usize])
    }
}
impl From<[u8; 8]> for BlockDxt1 {
    fn from(bytes: [u8; 8]) -> Self {
        Self::from_bytes(bytes)
    }
}
impl From<BlockDxt1> for [u8; 8] {
    fn from(block: BlockDxt1) -> Self {
        block.to_bytes()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct IndexList {
    data: u32,
}
impl IndexList {
    /// All pixels select palette entry 2.
    pub const ALL_2: Self = Self { data: 0xAAAA_AAAA };
    /// All pixels select palette entry 3.
    pub const ALL_3: Self = Self { data: 0xFFFF_FFFF };

    pub fn new_empty() -> Self {
        Self { data: 0 }
    }

    pub fn get(&self, index: usize) -> u8 {
        debug_assert!(index < 16);
        ((self.data >> (index * 2)) & 0b11) as u8
    }
    pub fn set(&mut self, index: usize, value: u8) {
        debug_assert!(index < 16);
        debug_assert!(value < 4);
        self.data = (self.data & !(0b11 << (index * 2))) | ((value as u32) << (index * 2));
    }

    /// Swaps entry 0 with 1 and entry 2 with 3.
    ///
    /// This is the index remapping needed after swapping the two endpoints of
    /// a 4-color block.
    pub fn swap_endpoints(self) -> Self {
        Self {
            data: self.data ^ 0x5555_5555,
        }
    }

    pub fn data(&self) -> u32 {
        self.data
    }
}
impl From<u32> for IndexList {
    fn from(data: u32) -> Self {
        Self { data }
    }
}
