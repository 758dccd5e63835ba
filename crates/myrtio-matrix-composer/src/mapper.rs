//! Pixel mappers
//!
//! A mapper transforms the coordinate space the application draws into
//! (the visible canvas) onto the physical canvas formed by the chained and
//! parallel panels. Mappers are chained: the first one listed sits closest
//! to the hardware, the last one defines the visible canvas.

use core::fmt::{self, Write};

use heapless::{String, Vec};

use crate::config::ConfigError;

/// Maximum number of mappers in a chain
pub const MAX_MAPPERS: usize = 4;

/// Capacity of an encoded mapper list
pub const ENCODED_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub const fn area(self) -> usize {
        self.width * self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelMapper {
    /// Clockwise rotation, normalized to 0, 90, 180 or 270 degrees
    Rotate(u16),
    /// Folds a chain into a U shape: the second half of the chain is
    /// mounted upside down below the first half.
    UArrangement,
}

impl PixelMapper {
    /// Parse a single mapper entry such as `Rotate:90` or `U-mapper`
    pub fn parse(entry: &str) -> Result<Self, ConfigError> {
        let (name, parameter) = match entry.split_once(':') {
            Some((name, parameter)) => (name.trim(), Some(parameter.trim())),
            None => (entry.trim(), None),
        };

        if name.eq_ignore_ascii_case("rotate") {
            let angle = match parameter {
                None | Some("") => 0,
                Some(value) => value
                    .parse::<i32>()
                    .map_err(|_| ConfigError::InvalidMapperParameter)?,
            };
            if angle % 90 != 0 {
                return Err(ConfigError::InvalidRotation(angle));
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            return Ok(Self::Rotate(angle.rem_euclid(360) as u16));
        }

        if name.eq_ignore_ascii_case("u-mapper") {
            return match parameter {
                None | Some("") => Ok(Self::UArrangement),
                Some(_) => Err(ConfigError::InvalidMapperParameter),
            };
        }

        Err(ConfigError::UnknownMapper)
    }

    /// Visible size produced from a `matrix` sized input
    pub fn visible_size(self, matrix: Size) -> Size {
        match self {
            Self::Rotate(90 | 270) => Size::new(matrix.height, matrix.width),
            Self::Rotate(_) => matrix,
            Self::UArrangement => Size::new(matrix.width / 2, matrix.height * 2),
        }
    }

    /// Map a visible coordinate onto the `matrix` sized input
    fn map(self, matrix: Size, parallel: usize, x: usize, y: usize) -> (usize, usize) {
        match self {
            Self::Rotate(90) => (matrix.width - y - 1, x),
            Self::Rotate(180) => (matrix.width - x - 1, matrix.height - y - 1),
            Self::Rotate(270) => (y, matrix.height - x - 1),
            Self::Rotate(_) => (x, y),
            Self::UArrangement => {
                let panel_height = matrix.height / parallel;
                let half_width = matrix.width / 2;
                let slab_height = 2 * panel_height;
                let base_y = (y / slab_height) * panel_height;
                let y = y % slab_height;
                if y < panel_height {
                    (x + half_width, base_y + y)
                } else {
                    (half_width - x - 1, base_y + slab_height - y - 1)
                }
            }
        }
    }
}

impl fmt::Display for PixelMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rotate(angle) => write!(f, "Rotate:{angle}"),
            Self::UArrangement => f.write_str("U-mapper"),
        }
    }
}

/// Parsed mapper list, not yet bound to a canvas
pub type MapperList = Vec<PixelMapper, MAX_MAPPERS>;

/// Mapper chain resolved against a hardware canvas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperChain {
    mappers: MapperList,
    /// `sizes[0]` is the hardware canvas, `sizes[i + 1]` the output of mapper `i`
    sizes: Vec<Size, { MAX_MAPPERS + 1 }>,
    parallel: usize,
}

impl MapperChain {
    /// Chain without any mapper
    pub fn identity(hardware: Size) -> Self {
        let mut sizes = Vec::new();
        // Capacity is at least one.
        let _ = sizes.push(hardware);
        Self {
            mappers: Vec::new(),
            sizes,
            parallel: 1,
        }
    }

    /// Parse a `;` separated mapper list, e.g. `"Rotate:90;U-mapper"`
    ///
    /// Empty entries are skipped, so an empty string yields an empty list.
    pub fn parse(config: &str) -> Result<MapperList, ConfigError> {
        let mut mappers = MapperList::new();
        for entry in config.split(';').filter(|entry| !entry.trim().is_empty()) {
            mappers
                .push(PixelMapper::parse(entry)?)
                .map_err(|_| ConfigError::TooManyMappers)?;
        }
        Ok(mappers)
    }

    /// Bind mappers to the hardware canvas, checking each one stays bijective
    pub fn resolve(
        mappers: &[PixelMapper],
        hardware: Size,
        chain_length: usize,
        parallel: usize,
    ) -> Result<Self, ConfigError> {
        let mut chain = Self::identity(hardware);
        chain.parallel = parallel;

        let mut current = hardware;
        for &mapper in mappers {
            if mapper == PixelMapper::UArrangement {
                if chain_length % 2 != 0 {
                    return Err(ConfigError::MapperNotApplicable(
                        "U-mapper needs an even chain length",
                    ));
                }
                if current.width % 2 != 0 || current.height % parallel != 0 {
                    return Err(ConfigError::MapperNotApplicable(
                        "U-mapper input cannot be folded",
                    ));
                }
            }
            current = mapper.visible_size(current);
            chain
                .mappers
                .push(mapper)
                .map_err(|_| ConfigError::TooManyMappers)?;
            chain
                .sizes
                .push(current)
                .map_err(|_| ConfigError::TooManyMappers)?;
        }
        Ok(chain)
    }

    pub fn mappers(&self) -> &[PixelMapper] {
        &self.mappers
    }

    pub fn is_identity(&self) -> bool {
        self.mappers.is_empty()
    }

    pub fn hardware_size(&self) -> Size {
        self.sizes.first().copied().unwrap_or_default()
    }

    pub fn visible_size(&self) -> Size {
        self.sizes.last().copied().unwrap_or_default()
    }

    /// Map a visible coordinate to its hardware coordinate
    ///
    /// Coordinates must lie inside [`Self::visible_size`].
    pub fn map_to_hardware(&self, x: usize, y: usize) -> (usize, usize) {
        self.mappers
            .iter()
            .zip(self.sizes.iter())
            .rev()
            .fold((x, y), |(x, y), (mapper, &input)| {
                mapper.map(input, self.parallel, x, y)
            })
    }

    /// Canonical `;` separated representation
    pub fn encode(&self) -> String<ENCODED_CAPACITY> {
        let mut encoded = String::new();
        // At most MAX_MAPPERS entries of up to 11 bytes each.
        let _ = write!(encoded, "{self}");
        encoded
    }
}

impl fmt::Display for MapperChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, mapper) in self.mappers.iter().enumerate() {
            if index > 0 {
                f.write_char(';')?;
            }
            write!(f, "{mapper}")?;
        }
        Ok(())
    }
}
