use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

/// MatrixScanner reads one raw sample of every physical key of a half.
///
/// `true` means the key reads as pressed. The scanner keeps no state between calls.
pub trait MatrixScanner<const N: usize> {
    fn scan(&mut self) -> [bool; N];
}

/// Drives one row low for the lifetime of the guard, and back high when dropped.
struct RowSelect<'a, P: OutputPin> {
    pin: &'a mut P,
}

impl<'a, P: OutputPin> RowSelect<'a, P> {
    fn new(pin: &'a mut P) -> Self {
        pin.set_low().ok();
        Self { pin }
    }
}

impl<P: OutputPin> Drop for RowSelect<'_, P> {
    fn drop(&mut self) {
        self.pin.set_high().ok();
    }
}

/// Matrix is the physical pcb layout of one half.
///
/// The first `FN` physical indices are standalone function keys on their own pull-up input
/// pins. The rest is a `ROW` x `COL` matrix: rows are outputs idling high, columns are pull-up
/// inputs, and a key at (row, col) reads low while its row is driven low. The physical index of a
/// matrix key is `FN + row * COL + col`.
pub struct Matrix<In: InputPin, Out: OutputPin, D: DelayNs, const FN: usize, const ROW: usize, const COL: usize> {
    /// Function key pins, active low
    function_pins: [In; FN],
    /// Row pins of the pcb matrix
    row_pins: [Out; ROW],
    /// Column pins of the pcb matrix, active low
    col_pins: [In; COL],
    /// Settling delay after selecting a row
    delay: D,
}

impl<In: InputPin, Out: OutputPin, D: DelayNs, const FN: usize, const ROW: usize, const COL: usize>
    Matrix<In, Out, D, FN, ROW, COL>
{
    /// Create a matrix from its pins. All rows are released (driven high).
    pub fn new(function_pins: [In; FN], mut row_pins: [Out; ROW], col_pins: [In; COL], delay: D) -> Self {
        for row in row_pins.iter_mut() {
            row.set_high().ok();
        }
        Matrix {
            function_pins,
            row_pins,
            col_pins,
            delay,
        }
    }

    /// Give the pins back.
    pub fn release(self) -> ([In; FN], [Out; ROW], [In; COL], D) {
        (self.function_pins, self.row_pins, self.col_pins, self.delay)
    }
}

impl<In: InputPin, Out: OutputPin, D: DelayNs, const FN: usize, const ROW: usize, const COL: usize, const N: usize>
    MatrixScanner<N> for Matrix<In, Out, D, FN, ROW, COL>
{
    fn scan(&mut self) -> [bool; N] {
        const { assert!(N == FN + ROW * COL, "key count must match the matrix geometry") };

        let mut raw = [false; N];
        for (row_idx, row_pin) in self.row_pins.iter_mut().enumerate() {
            let _selected = RowSelect::new(row_pin);
            // Wait 1us ensuring the change comes into effect
            self.delay.delay_us(1);
            for (col_idx, col_pin) in self.col_pins.iter_mut().enumerate() {
                raw[FN + row_idx * COL + col_idx] = col_pin.is_low().unwrap_or(false);
            }
        }

        for (idx, pin) in self.function_pins.iter_mut().enumerate() {
            raw[idx] = pin.is_low().unwrap_or(false);
        }

        raw
    }
}
