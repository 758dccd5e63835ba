//! Panel configuration model
//!
//! [`MatrixOptions`] is the raw option object accepted from callers (and from
//! JSON); [`PanelConfig`] is its validated, immutable form. Every other
//! component is parameterized by a `PanelConfig` at construction time.

use core::fmt;

use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Deserializer};

use crate::color::LedSequence;
use crate::mapper::{MapperChain, Size};
use crate::math::scale_percent;

/// HUB75 panels light two sub-panels at once, so a 1:16 multiplexed panel
/// has 32 rows but only 16 row addresses.
pub const SUB_PANELS: usize = 2;

/// Maximum number of parallel chains
pub const MAX_PARALLEL: usize = 4;

/// Maximum number of daisy-chained panels
pub const MAX_CHAIN_LENGTH: u8 = 4;

/// Maximum usable bit planes
pub const MAX_PWM_BITS: u8 = 11;

/// Upper bound for `pwm_bits + pwm_dither_bits`, keeps channel targets in `u16`
pub const MAX_PRECISION_BITS: u8 = 16;

/// Number of row address lines (A..E)
pub const MAX_ADDRESS_LINES: usize = 5;

/// GPIO driven by the PWM peripheral
const PWM_OUTPUT_ENABLE_GPIO: u8 = 18;

const VALID_ROWS: [u8; 3] = [16, 32, 64];
const VALID_COLS: [u8; 4] = [16, 32, 40, 64];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field is outside of its declared domain
    OutOfRange { field: &'static str },
    /// Pixel mapper name is not known
    UnknownMapper,
    /// Rotation angle is not a multiple of 90 degrees
    InvalidRotation(i32),
    /// Pixel mapper parameter is missing or malformed
    InvalidMapperParameter,
    /// Pixel mapper cannot map the canvas bijectively
    MapperNotApplicable(&'static str),
    /// More pixel mappers than the chain can hold
    TooManyMappers,
    /// Option object could not be parsed
    Parse,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { field } => write!(f, "{field} is out of range"),
            Self::UnknownMapper => f.write_str("unknown pixel mapper"),
            Self::InvalidRotation(angle) => {
                write!(f, "rotation of {angle} degrees is not a multiple of 90")
            }
            Self::InvalidMapperParameter => f.write_str("invalid pixel mapper parameter"),
            Self::MapperNotApplicable(reason) => write!(f, "pixel mapper not applicable: {reason}"),
            Self::TooManyMappers => f.write_str("too many pixel mappers"),
            Self::Parse => f.write_str("malformed matrix options"),
        }
    }
}

impl core::error::Error for ConfigError {}

/// Scan order of the row addresses
///
/// Encoded as `0` (progressive) or `1` (interlaced) in option objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    #[default]
    Progressive,
    /// Even row addresses on one cycle, odd on the next
    Interlaced,
}

impl TryFrom<u8> for ScanMode {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Progressive),
            1 => Ok(Self::Interlaced),
            _ => Err(ConfigError::OutOfRange { field: "scan_mode" }),
        }
    }
}

/// Encoded as `0` (direct) or `1` (AB) in option objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::upper_case_acronyms)]
pub enum RowAddressType {
    /// Row index written directly to the A..E lines
    #[default]
    Direct,
    /// Panels exposing only A/B: A clocks, B shifts the row select
    AB,
}

impl TryFrom<u8> for RowAddressType {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Direct),
            1 => Ok(Self::AB),
            _ => Err(ConfigError::OutOfRange {
                field: "row_address_type",
            }),
        }
    }
}

/// Encoded as `0` (direct), `1` (stripe) or `2` (checker) in option objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Multiplexing {
    #[default]
    Direct,
    Stripe,
    Checker,
}

impl TryFrom<u8> for Multiplexing {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Direct),
            1 => Ok(Self::Stripe),
            2 => Ok(Self::Checker),
            _ => Err(ConfigError::OutOfRange {
                field: "multiplexing",
            }),
        }
    }
}

/// Read an enum from its numeric discriminant
fn deserialize_discriminant<'de, D, T>(deserializer: D, expected: &'static str) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u8, Error = ConfigError>,
{
    let value = u8::deserialize(deserializer)?;
    T::try_from(value)
        .map_err(|_| D::Error::invalid_value(Unexpected::Unsigned(u64::from(value)), &expected))
}

impl<'de> Deserialize<'de> for ScanMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_discriminant(deserializer, "0 or 1")
    }
}

impl<'de> Deserialize<'de> for RowAddressType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_discriminant(deserializer, "0 or 1")
    }
}

impl<'de> Deserialize<'de> for Multiplexing {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_discriminant(deserializer, "0, 1 or 2")
    }
}

impl Multiplexing {
    /// Physical passes emitted per logical row and bit plane
    pub const fn passes(self) -> u8 {
        match self {
            Self::Direct => 1,
            Self::Stripe | Self::Checker => 2,
        }
    }
}

/// GPIO wiring of the controller board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HardwareMapping {
    #[default]
    Regular,
    AdafruitHat,
    AdafruitHatPwm,
    RegularPi1,
    Classic,
    ClassicPi1,
}

impl HardwareMapping {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::AdafruitHat => "adafruit-hat",
            Self::AdafruitHatPwm => "adafruit-hat-pwm",
            Self::RegularPi1 => "regular-pi1",
            Self::Classic => "classic",
            Self::ClassicPi1 => "classic-pi1",
        }
    }
}

/// Raw matrix options, as accepted from callers
///
/// Field names follow the native binding's option object. Missing JSON
/// fields take the defaults of [`MatrixOptions::default`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatrixOptions<'a> {
    pub rows: u8,
    pub cols: u8,
    pub chain_length: u8,
    pub parallel: u8,
    pub pwm_bits: u8,
    pub pwm_lsb_nanoseconds: u32,
    pub pwm_dither_bits: u8,
    pub brightness: u8,
    pub scan_mode: ScanMode,
    pub row_address_type: RowAddressType,
    pub multiplexing: Multiplexing,
    pub led_sequence: LedSequence,
    pub hardware_mapping: HardwareMapping,
    pub inverse_colors: bool,
    pub luminance_correct: bool,
    pub show_refresh_rate: bool,
    /// Never pulse output enable from a PWM peripheral
    pub disable_hardware_pulsing: bool,
    /// Serialized mapper list, e.g. `"Rotate:90;U-mapper"`
    pub pixel_mapper_config: &'a str,
}

impl Default for MatrixOptions<'_> {
    fn default() -> Self {
        Self {
            rows: 32,
            cols: 32,
            chain_length: 1,
            parallel: 1,
            pwm_bits: MAX_PWM_BITS,
            pwm_lsb_nanoseconds: 130,
            pwm_dither_bits: 0,
            brightness: 100,
            scan_mode: ScanMode::Progressive,
            row_address_type: RowAddressType::Direct,
            multiplexing: Multiplexing::Direct,
            led_sequence: LedSequence::Rgb,
            hardware_mapping: HardwareMapping::Regular,
            inverse_colors: false,
            luminance_correct: true,
            show_refresh_rate: false,
            disable_hardware_pulsing: false,
            pixel_mapper_config: "",
        }
    }
}

impl MatrixOptions<'_> {
    /// Shorthand for [`PanelConfig::new`]
    pub fn validate(&self) -> Result<PanelConfig, ConfigError> {
        PanelConfig::new(self)
    }
}

/// Options of the process running the refresh loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeOptions {
    /// Extra writes per GPIO update, for panels that cannot keep up
    pub gpio_slowdown: u8,
    /// Put the GPIO lines into a known idle state when the sink is created
    pub do_gpio_init: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            gpio_slowdown: 0,
            do_gpio_init: true,
        }
    }
}

impl RuntimeOptions {
    pub fn from_json(json: &[u8]) -> Result<Self, ConfigError> {
        serde_json_core::from_slice::<Self>(json)
            .map(|(options, _)| options)
            .map_err(|_| ConfigError::Parse)
    }
}

/// Validated, immutable panel configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PanelConfig {
    rows: u8,
    cols: u8,
    chain_length: u8,
    parallel: u8,
    pwm_bits: u8,
    pwm_lsb_nanoseconds: u32,
    pwm_dither_bits: u8,
    brightness: u8,
    scan_mode: ScanMode,
    row_address_type: RowAddressType,
    multiplexing: Multiplexing,
    led_sequence: LedSequence,
    hardware_mapping: HardwareMapping,
    inverse_colors: bool,
    luminance_correct: bool,
    show_refresh_rate: bool,
    disable_hardware_pulsing: bool,
    mappers: MapperChain,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            rows: 32,
            cols: 32,
            chain_length: 1,
            parallel: 1,
            pwm_bits: MAX_PWM_BITS,
            pwm_lsb_nanoseconds: 130,
            pwm_dither_bits: 0,
            brightness: 100,
            scan_mode: ScanMode::Progressive,
            row_address_type: RowAddressType::Direct,
            multiplexing: Multiplexing::Direct,
            led_sequence: LedSequence::Rgb,
            hardware_mapping: HardwareMapping::Regular,
            inverse_colors: false,
            luminance_correct: true,
            show_refresh_rate: false,
            disable_hardware_pulsing: false,
            mappers: MapperChain::identity(Size::new(32, 32)),
        }
    }
}

impl PanelConfig {
    /// Validate raw options into an immutable configuration
    pub fn new(options: &MatrixOptions<'_>) -> Result<Self, ConfigError> {
        if !VALID_ROWS.contains(&options.rows) {
            return Err(ConfigError::OutOfRange { field: "rows" });
        }
        if !VALID_COLS.contains(&options.cols) {
            return Err(ConfigError::OutOfRange { field: "cols" });
        }
        if !(1..=MAX_CHAIN_LENGTH).contains(&options.chain_length) {
            return Err(ConfigError::OutOfRange {
                field: "chain_length",
            });
        }
        if !(1..=MAX_PARALLEL).contains(&usize::from(options.parallel)) {
            return Err(ConfigError::OutOfRange { field: "parallel" });
        }
        check_pwm_bits(options.pwm_bits, options.pwm_dither_bits)?;
        if options.pwm_lsb_nanoseconds == 0
            || u64::from(options.pwm_lsb_nanoseconds) << (options.pwm_bits - 1)
                > u64::from(u32::MAX)
        {
            return Err(ConfigError::OutOfRange {
                field: "pwm_lsb_nanoseconds",
            });
        }
        check_brightness(options.brightness)?;

        let hardware = Size::new(
            usize::from(options.cols) * usize::from(options.chain_length),
            usize::from(options.rows) * usize::from(options.parallel),
        );
        let mappers = MapperChain::parse(options.pixel_mapper_config)?;
        let mappers = MapperChain::resolve(
            &mappers,
            hardware,
            usize::from(options.chain_length),
            usize::from(options.parallel),
        )?;

        Ok(Self {
            rows: options.rows,
            cols: options.cols,
            chain_length: options.chain_length,
            parallel: options.parallel,
            pwm_bits: options.pwm_bits,
            pwm_lsb_nanoseconds: options.pwm_lsb_nanoseconds,
            pwm_dither_bits: options.pwm_dither_bits,
            brightness: options.brightness,
            scan_mode: options.scan_mode,
            row_address_type: options.row_address_type,
            multiplexing: options.multiplexing,
            led_sequence: options.led_sequence,
            hardware_mapping: options.hardware_mapping,
            inverse_colors: options.inverse_colors,
            luminance_correct: options.luminance_correct,
            show_refresh_rate: options.show_refresh_rate,
            disable_hardware_pulsing: options.disable_hardware_pulsing,
            mappers,
        })
    }

    /// Parse and validate a JSON option object
    ///
    /// # Example
    /// `{"rows": 32, "cols": 64, "chain_length": 2, "pixel_mapper_config": "Rotate:90"}`
    pub fn from_json(json: &[u8]) -> Result<Self, ConfigError> {
        let (options, _) =
            serde_json_core::from_slice::<MatrixOptions<'_>>(json).map_err(|_| ConfigError::Parse)?;
        Self::new(&options)
    }

    pub fn rows(&self) -> usize {
        usize::from(self.rows)
    }

    pub fn cols(&self) -> usize {
        usize::from(self.cols)
    }

    pub fn chain_length(&self) -> usize {
        usize::from(self.chain_length)
    }

    pub fn parallel(&self) -> usize {
        usize::from(self.parallel)
    }

    pub fn pwm_bits(&self) -> u8 {
        self.pwm_bits
    }

    pub fn pwm_lsb_nanoseconds(&self) -> u32 {
        self.pwm_lsb_nanoseconds
    }

    pub fn pwm_dither_bits(&self) -> u8 {
        self.pwm_dither_bits
    }

    /// Initial brightness in percent
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn scan_mode(&self) -> ScanMode {
        self.scan_mode
    }

    pub fn row_address_type(&self) -> RowAddressType {
        self.row_address_type
    }

    pub fn multiplexing(&self) -> Multiplexing {
        self.multiplexing
    }

    pub fn led_sequence(&self) -> LedSequence {
        self.led_sequence
    }

    pub fn hardware_mapping(&self) -> HardwareMapping {
        self.hardware_mapping
    }

    pub fn inverse_colors(&self) -> bool {
        self.inverse_colors
    }

    pub fn luminance_correct(&self) -> bool {
        self.luminance_correct
    }

    pub fn show_refresh_rate(&self) -> bool {
        self.show_refresh_rate
    }

    pub fn disable_hardware_pulsing(&self) -> bool {
        self.disable_hardware_pulsing
    }

    /// Whether output enable may be pulsed by a PWM peripheral
    ///
    /// Requires the mapping to route output enable to GPIO 18, the pin the
    /// PWM peripheral drives. Sinks without such a peripheral always time
    /// output enable in software.
    pub fn hardware_pulsing(&self) -> bool {
        !self.disable_hardware_pulsing
            && self
                .hardware_mapping
                .pin_layout()
                .is_some_and(|layout| layout.output_enable == PWM_OUTPUT_ENABLE_GPIO)
    }

    pub fn mappers(&self) -> &MapperChain {
        &self.mappers
    }

    /// Hardware canvas width: `cols × chain_length`
    pub fn canvas_width(&self) -> usize {
        self.cols() * self.chain_length()
    }

    /// Hardware canvas height: `rows × parallel`
    pub fn canvas_height(&self) -> usize {
        self.rows() * self.parallel()
    }

    /// Canvas size seen by the application, after pixel mappers
    pub fn visible_size(&self) -> Size {
        self.mappers.visible_size()
    }

    /// Row addresses per panel
    pub fn double_rows(&self) -> usize {
        self.rows() / SUB_PANELS
    }

    /// Row addresses emitted per scan cycle
    pub fn rows_per_cycle(&self) -> usize {
        match self.scan_mode {
            ScanMode::Progressive => self.double_rows(),
            ScanMode::Interlaced => self.double_rows() / 2,
        }
    }

    /// Dwell time of bit plane `plane` at the given brightness
    pub fn plane_nanoseconds(&self, plane: u8, brightness: u8) -> u32 {
        plane_nanoseconds(self.pwm_lsb_nanoseconds, plane, brightness)
    }

    /// Total output-enable time of one scan cycle at the configured depth
    pub fn cycle_nanoseconds(&self, brightness: u8) -> u64 {
        self.cycle_nanoseconds_at(self.pwm_bits, brightness)
    }

    /// Total output-enable time of one scan cycle emitting `pwm_bits` planes
    pub fn cycle_nanoseconds_at(&self, pwm_bits: u8, brightness: u8) -> u64 {
        let per_row: u64 = (0..pwm_bits)
            .map(|plane| u64::from(self.plane_nanoseconds(plane, brightness)))
            .sum();
        per_row * u64::from(self.multiplexing.passes()) * self.rows_per_cycle() as u64
    }

    /// Validate a live `pwm_bits` change against this configuration
    pub fn check_pwm_bits(&self, pwm_bits: u8) -> Result<(), ConfigError> {
        check_pwm_bits(pwm_bits, self.pwm_dither_bits)?;
        if u64::from(self.pwm_lsb_nanoseconds) << (pwm_bits - 1) > u64::from(u32::MAX) {
            return Err(ConfigError::OutOfRange { field: "pwm_bits" });
        }
        Ok(())
    }
}

/// Validate a brightness percentage
pub fn check_brightness(brightness: u8) -> Result<(), ConfigError> {
    if brightness > 100 {
        return Err(ConfigError::OutOfRange {
            field: "brightness",
        });
    }
    Ok(())
}

fn check_pwm_bits(pwm_bits: u8, dither_bits: u8) -> Result<(), ConfigError> {
    if !(1..=MAX_PWM_BITS).contains(&pwm_bits) {
        return Err(ConfigError::OutOfRange { field: "pwm_bits" });
    }
    if pwm_bits.saturating_add(dither_bits) > MAX_PRECISION_BITS {
        return Err(ConfigError::OutOfRange {
            field: "pwm_dither_bits",
        });
    }
    Ok(())
}

/// `2^plane × lsb × brightness / 100`, saturating at `u32::MAX`
#[allow(clippy::cast_possible_truncation)]
pub fn plane_nanoseconds(lsb_nanoseconds: u32, plane: u8, brightness: u8) -> u32 {
    let full = u64::from(lsb_nanoseconds) << plane;
    scale_percent(full, brightness).min(u64::from(u32::MAX)) as u32
}
