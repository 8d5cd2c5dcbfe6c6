use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

/// Switches of a fake row2col pcb, shared by its pins
#[derive(Clone)]
pub struct FakeBoard<const ROW: usize, const COL: usize> {
    pressed: Rc<RefCell<[[bool; COL]; ROW]>>,
    driven_row: Rc<Cell<Option<usize>>>,
}

impl<const ROW: usize, const COL: usize> FakeBoard<ROW, COL> {
    pub fn new() -> Self {
        Self {
            pressed: Rc::new(RefCell::new([[false; COL]; ROW])),
            driven_row: Rc::new(Cell::new(None)),
        }
    }

    pub fn set(&self, row: usize, col: usize, pressed: bool) {
        self.pressed.borrow_mut()[row][col] = pressed;
    }

    /// Input pins are the columns, output pins are the rows
    pub fn pins(&self) -> ([FakeInput<ROW, COL>; COL], [FakeOutput<ROW, COL>; ROW]) {
        (
            core::array::from_fn(|col| FakeInput { board: self.clone(), col }),
            core::array::from_fn(|row| FakeOutput { board: self.clone(), row }),
        )
    }
}

pub struct FakeInput<const ROW: usize, const COL: usize> {
    board: FakeBoard<ROW, COL>,
    col: usize,
}

pub struct FakeOutput<const ROW: usize, const COL: usize> {
    board: FakeBoard<ROW, COL>,
    row: usize,
}

impl<const ROW: usize, const COL: usize> ErrorType for FakeInput<ROW, COL> {
    type Error = Infallible;
}

impl<const ROW: usize, const COL: usize> InputPin for FakeInput<ROW, COL> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self
            .board
            .driven_row
            .get()
            .is_some_and(|row| self.board.pressed.borrow()[row][self.col]))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

impl<const ROW: usize, const COL: usize> ErrorType for FakeOutput<ROW, COL> {
    type Error = Infallible;
}

impl<const ROW: usize, const COL: usize> OutputPin for FakeOutput<ROW, COL> {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.board.driven_row.set(Some(self.row));
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.board.driven_row.set(None);
        Ok(())
    }
}
