use num_traits::{FromPrimitive, NumCast};

/// Width and height of a rectangular area.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size<Num: num_traits::Num + PartialOrd + Copy + PartialEq = f64> {
    width: Num,
    height: Num,
}

impl<Num: num_traits::Num + FromPrimitive + PartialOrd + Copy + NumCast> Size<Num> {
    /// Creates a new size.
    pub fn new(width: Num, height: Num) -> Self {
        Self { width, height }
    }

    /// Width.
    pub fn width(&self) -> Num {
        self.width
    }

    /// Height.
    pub fn height(&self) -> Num {
        self.height
    }

    /// Converts the size into another numeric type. Returns `None` if either dimension does not
    /// fit into the target type.
    pub fn cast<T: num_traits::Num + FromPrimitive + PartialOrd + Copy + NumCast>(
        &self,
    ) -> Option<Size<T>> {
        Some(Size {
            width: NumCast::from(self.width)?,
            height: NumCast::from(self.height)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cast_truncates() {
        let size = Size::new(1203.7, 550.4);
        assert_eq!(size.cast::<u32>(), Some(Size::new(1203, 550)));
        assert_eq!(Size::new(-1.0, 2.0).cast::<u32>(), None);
    }
}
