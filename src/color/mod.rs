use glam::Vec3A;

/// Bit replication of a 5-bit or 6-bit channel to 8 bits.
const fn expand_bits(v: u8, bits: u32) -> u8 {
    (v << (8 - bits)) | (v >> (2 * bits - 8))
}

/// Functions for converting **FROM Unorm5** values to other formats.
pub(crate) mod n5 {
    #[inline(always)]
    pub const fn n8(x: u8) -> u8 {
        debug_assert!(x <= 31);
        super::expand_bits(x, 5)
    }
    #[inline(always)]
    pub fn from_f32(x: f32) -> u8 {
        super::quantize_channel(x, 31, &super::MIDPOINTS5)
    }
}

/// Functions for converting **FROM Unorm6** values to other formats.
pub(crate) mod n6 {
    #[inline(always)]
    pub const fn n8(x: u8) -> u8 {
        debug_assert!(x <= 63);
        super::expand_bits(x, 6)
    }
    #[inline(always)]
    pub fn from_f32(x: f32) -> u8 {
        super::quantize_channel(x, 63, &super::MIDPOINTS6)
    }
}

/// The values halfway between two neighboring bit-expanded grid values,
/// normalized to [0, 1].
///
/// The expansion to 8 bits is not uniform, so the halfway points are not
/// `(i + 0.5) / 31`.
const MIDPOINTS5: [f32; 32] = midpoints::<32>(5);
const MIDPOINTS6: [f32; 64] = midpoints::<64>(6);

const fn midpoints<const N: usize>(bits: u32) -> [f32; N] {
    let mut table = [1.0_f32; N];
    let mut i = 0;
    while i + 1 < N {
        let lo = expand_bits(i as u8, bits) as f32;
        let hi = expand_bits(i as u8 + 1, bits) as f32;
        table[i] = (lo + hi) / 2.0 / 255.0;
        i += 1;
    }
    table
}

fn quantize_channel(x: f32, max: u8, midpoints: &[f32]) -> u8 {
    let x = x.clamp(0.0, 1.0);
    // NaN turns into 0 here
    let q = ((x * max as f32) as u8).min(max);
    if q < max && x > midpoints[q as usize] {
        q + 1
    } else {
        q
    }
}

/// A 16-bit 5:6:5 color, the endpoint representation of BC1.
///
/// Endpoints compare by their packed 16-bit value, which is the comparison
/// BC1 decoders use to select between 4-color and 3-color mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color16 {
    r: u8,
    g: u8,
    b: u8,
}
impl Color16 {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(31, 63, 31);

    /// Creates a new color from its raw fields.
    ///
    /// `r` and `b` must be less than 32 and `g` less than 64. Out-of-range
    /// bits are masked off in release builds.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        debug_assert!(r < 32);
        debug_assert!(g < 64);
        debug_assert!(b < 32);

        Self {
            r: r & 0x1F,
            g: g & 0x3F,
            b: b & 0x1F,
        }
    }

    pub const fn r(self) -> u8 {
        self.r
    }
    pub const fn g(self) -> u8 {
        self.g
    }
    pub const fn b(self) -> u8 {
        self.b
    }

    pub const fn from_u16(q: u16) -> Self {
        Self {
            r: ((q >> 11) & 0b11111) as u8,
            g: ((q >> 5) & 0b111111) as u8,
            b: (q & 0b11111) as u8,
        }
    }
    pub const fn to_u16(self) -> u16 {
        (self.r as u16) << 11 | (self.g as u16) << 5 | self.b as u16
    }

    /// Quantizes a color in [0, 1] to the nearest 5:6:5 color.
    ///
    /// "Nearest" is measured after bit expansion to 8 bits, which is what
    /// decoders see. Channels outside [0, 1] are clamped.
    pub fn quantize(color: Vec3A) -> Self {
        Self::new(
            n5::from_f32(color.x),
            n6::from_f32(color.y),
            n5::from_f32(color.z),
        )
    }

    /// Returns the 8-bit RGB color decoders produce for this endpoint.
    pub const fn expand(self) -> [u8; 3] {
        [n5::n8(self.r), n6::n8(self.g), n5::n8(self.b)]
    }

    /// The expanded color normalized to [0, 1].
    pub fn to_color(self) -> Vec3A {
        let [r, g, b] = self.expand();
        Vec3A::new(r as f32, g as f32, b as f32) / 255.0
    }

    /// Moves each channel by the given delta, saturating at the field range.
    pub(crate) fn offset(self, delta: [i8; 3]) -> Self {
        fn channel(value: u8, delta: i8, max: u8) -> u8 {
            (value as i16 + delta as i16).clamp(0, max as i16) as u8
        }
        Self::new(
            channel(self.r, delta[0], 31),
            channel(self.g, delta[1], 63),
            channel(self.b, delta[2], 31),
        )
    }
}
impl PartialOrd for Color16 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Color16 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_u16().cmp(&other.to_u16())
    }
}
impl From<u16> for Color16 {
    fn from(value: u16) -> Self {
        Self::from_u16(value)
    }
}
impl From<Color16> for u16 {
    fn from(value: Color16) -> Self {
        value.to_u16()
    }
}

/// Converts a color in [0, 1] to 8-bit RGB with rounding.
pub(crate) fn to_rgb8(color: Vec3A) -> [u8; 3] {
    let c = (color.clamp(Vec3A::ZERO, Vec3A::ONE) * 255.0 + 0.5).floor();
    [c.x as u8, c.y as u8, c.z as u8]
}
