use crate::error::{LabError, Result};
use serde::{Deserialize, Serialize};

/// Number of addresses in each register bank of the reference deployment.
pub const BANK_SIZE: usize = 100;

/// Simulated PLC scan cycle, reported in every state snapshot.
pub const SCAN_TIME_SECS: f64 = 0.1;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// A deep, owned copy of all four register banks at one instant.
///
/// This is the `state` wire payload; field names are part of the protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub coils: Vec<bool>,
    pub discrete_inputs: Vec<bool>,
    pub holding_registers: Vec<i16>,
    pub input_registers: Vec<i16>,
    pub scan_time: f64,
}

// ---------------------------------------------------------------------------
// ProcessImage
// ---------------------------------------------------------------------------

/// The authoritative in-memory register banks.
///
/// All four banks share one fixed length set at construction; a mutation to
/// an address outside `[0, len)` fails with `OutOfRange` and leaves the image
/// untouched. Register values are 16-bit signed; writes wrap rather than
/// reject on overflow.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessImage {
    coils: Vec<bool>,
    discrete_inputs: Vec<bool>,
    holding_registers: Vec<i16>,
    input_registers: Vec<i16>,
}

impl ProcessImage {
    /// All-zero banks of the given size.
    pub fn new(size: usize) -> Self {
        Self {
            coils: vec![false; size],
            discrete_inputs: vec![false; size],
            holding_registers: vec![0; size],
            input_registers: vec![0; size],
        }
    }

    /// Addresses per bank.
    pub fn len(&self) -> usize {
        self.coils.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coils.is_empty()
    }

    fn check(&self, bank: &'static str, address: usize) -> Result<()> {
        if address < self.len() {
            Ok(())
        } else {
            Err(LabError::OutOfRange {
                bank,
                address,
                size: self.len(),
            })
        }
    }

    // ---------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------

    /// Flip the discrete input at `address`.
    pub fn toggle_discrete_input(&mut self, address: usize) -> Result<()> {
        self.check("discrete_inputs", address)?;
        self.discrete_inputs[address] = !self.discrete_inputs[address];
        Ok(())
    }

    /// Flip the coil at `address`.
    pub fn toggle_coil(&mut self, address: usize) -> Result<()> {
        self.check("coils", address)?;
        self.coils[address] = !self.coils[address];
        Ok(())
    }

    /// Set the coil at `address`.
    pub fn set_coil(&mut self, address: usize, value: bool) -> Result<()> {
        self.check("coils", address)?;
        self.coils[address] = value;
        Ok(())
    }

    /// Store `value` in the holding register at `address`, wrapping to the
    /// 16-bit signed register width.
    pub fn set_holding_register(&mut self, address: usize, value: i64) -> Result<()> {
        self.check("holding_registers", address)?;
        self.holding_registers[address] = value as i16;
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------------

    pub fn coil(&self, address: usize) -> Result<bool> {
        self.check("coils", address)?;
        Ok(self.coils[address])
    }

    pub fn discrete_input(&self, address: usize) -> Result<bool> {
        self.check("discrete_inputs", address)?;
        Ok(self.discrete_inputs[address])
    }

    pub fn holding_register(&self, address: usize) -> Result<i16> {
        self.check("holding_registers", address)?;
        Ok(self.holding_registers[address])
    }

    /// Deep copy of all four banks.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            coils: self.coils.clone(),
            discrete_inputs: self.discrete_inputs.clone(),
            holding_registers: self.holding_registers.clone(),
            input_registers: self.input_registers.clone(),
            scan_time: SCAN_TIME_SECS,
        }
    }
}

impl Default for ProcessImage {
    fn default() -> Self {
        Self::new(BANK_SIZE)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_image_is_all_zero() {
        let image = ProcessImage::default();
        assert_eq!(image.len(), BANK_SIZE);
        let snap = image.snapshot();
        assert!(snap.coils.iter().all(|c| !c));
        assert!(snap.discrete_inputs.iter().all(|d| !d));
        assert!(snap.holding_registers.iter().all(|r| *r == 0));
        assert!(snap.input_registers.iter().all(|r| *r == 0));
    }

    #[test]
    fn toggle_flips_exactly_one_input() {
        let mut image = ProcessImage::default();
        image.toggle_discrete_input(5).unwrap();

        let snap = image.snapshot();
        for (i, value) in snap.discrete_inputs.iter().enumerate() {
            assert_eq!(*value, i == 5, "unexpected value at address {i}");
        }
        // Other banks untouched
        assert!(snap.coils.iter().all(|c| !c));

        image.toggle_discrete_input(5).unwrap();
        assert!(!image.discrete_input(5).unwrap());
    }

    #[test]
    fn toggle_coil_flips_exactly_one_coil() {
        let mut image = ProcessImage::default();
        image.toggle_coil(0).unwrap();
        assert!(image.coil(0).unwrap());
        assert!(!image.coil(1).unwrap());
        assert!(!image.discrete_input(0).unwrap());
    }

    #[test]
    fn set_register_then_read_returns_value() {
        let mut image = ProcessImage::default();
        image.set_holding_register(3, 800).unwrap();
        assert_eq!(image.holding_register(3).unwrap(), 800);

        let snap = image.snapshot();
        for (i, value) in snap.holding_registers.iter().enumerate() {
            let expected = if i == 3 { 800 } else { 0 };
            assert_eq!(*value, expected);
        }
    }

    #[test]
    fn set_register_wraps_to_i16() {
        let mut image = ProcessImage::default();
        image.set_holding_register(0, 65_536).unwrap();
        assert_eq!(image.holding_register(0).unwrap(), 0);

        image.set_holding_register(0, 32_768).unwrap();
        assert_eq!(image.holding_register(0).unwrap(), i16::MIN);

        image.set_holding_register(0, -1).unwrap();
        assert_eq!(image.holding_register(0).unwrap(), -1);
    }

    #[test]
    fn out_of_range_leaves_image_unchanged() {
        let mut image = ProcessImage::default();
        image.toggle_discrete_input(7).unwrap();
        image.set_holding_register(9, 42).unwrap();
        let before = image.snapshot();

        assert!(matches!(
            image.toggle_discrete_input(BANK_SIZE),
            Err(LabError::OutOfRange { address: 100, .. })
        ));
        assert!(image.set_holding_register(150, 10).is_err());
        assert!(image.set_coil(usize::MAX, true).is_err());

        assert_eq!(image.snapshot(), before);
    }

    #[test]
    fn snapshot_is_a_deep_copy() {
        let mut image = ProcessImage::default();
        let snap = image.snapshot();
        image.toggle_discrete_input(0).unwrap();
        assert!(!snap.discrete_inputs[0]);
    }

    #[test]
    fn snapshot_carries_scan_time() {
        let image = ProcessImage::new(8);
        let snap = image.snapshot();
        assert_eq!(snap.scan_time, SCAN_TIME_SECS);
        assert_eq!(snap.coils.len(), 8);
    }

    #[test]
    fn banks_share_one_length() {
        let image = ProcessImage::new(16);
        let snap = image.snapshot();
        assert_eq!(snap.coils.len(), 16);
        assert_eq!(snap.discrete_inputs.len(), 16);
        assert_eq!(snap.holding_registers.len(), 16);
        assert_eq!(snap.input_registers.len(), 16);
    }
}
