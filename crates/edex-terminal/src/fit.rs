use super::theme::CellMetrics;

const MIN_COLS: u16 = 2;
const MIN_ROWS: u16 = 1;

/// Pixel size of a mount point's container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainerSize {
    pub width: u32,
    pub height: u32,
}

impl ContainerSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Character-cell geometry of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub rows: u16,
    pub cols: u16,
}

impl Geometry {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }

    /// Control sequence the backend reads as a window resize request
    pub fn resize_sequence(&self) -> Vec<u8> {
        format!("\x1b[8;{};{}t", self.rows, self.cols).into_bytes()
    }
}

impl std::fmt::Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

/// Computes the rows/columns that fill a container
///
/// The addon remembers the last geometry it applied so repeated calls with
/// an unchanged container report no change.
#[derive(Debug, Clone)]
pub struct FitAddon {
    metrics: CellMetrics,
    applied: Option<Geometry>,
}

impl FitAddon {
    pub fn new(metrics: CellMetrics) -> Self {
        Self {
            metrics,
            applied: None,
        }
    }

    /// Geometry that fits `container`, or `None` for a hidden (zero-sized) one
    pub fn propose(&self, container: ContainerSize) -> Option<Geometry> {
        if container.is_empty() {
            return None;
        }
        let cols = (container.width as f32 / self.metrics.width).floor() as u32;
        let rows = (container.height as f32 / self.metrics.height).floor() as u32;
        Some(Geometry {
            rows: rows.clamp(MIN_ROWS as u32, u16::MAX as u32) as u16,
            cols: cols.clamp(MIN_COLS as u32, u16::MAX as u32) as u16,
        })
    }

    /// Propose a geometry and record it; returns it only when it differs from
    /// the one applied last time
    pub fn fit(&mut self, container: ContainerSize) -> Option<Geometry> {
        let proposed = self.propose(container)?;
        if self.applied == Some(proposed) {
            return None;
        }
        self.applied = Some(proposed);
        Some(proposed)
    }

    pub fn applied(&self) -> Option<Geometry> {
        self.applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn addon() -> FitAddon {
        FitAddon::new(CellMetrics {
            width: 9.0,
            height: 18.0,
        })
    }

    #[test]
    fn test_propose_floors_to_whole_cells() {
        let fit = addon();
        assert_eq!(fit.propose(ContainerSize::new(720, 432)), Some(Geometry::new(24, 80)));
        assert_eq!(fit.propose(ContainerSize::new(728, 449)), Some(Geometry::new(24, 80)));
        assert_eq!(fit.propose(ContainerSize::new(0, 432)), None);
    }

    #[test]
    fn test_propose_clamps_tiny_containers() {
        let fit = addon();
        assert_eq!(fit.propose(ContainerSize::new(3, 3)), Some(Geometry::new(MIN_ROWS, MIN_COLS)));
    }

    #[test]
    fn test_fit_is_idempotent() {
        let mut fit = addon();
        let size = ContainerSize::new(900, 360);
        assert_eq!(fit.fit(size), Some(Geometry::new(20, 100)));
        assert_eq!(fit.fit(size), None);
        assert_eq!(fit.fit(size), None);
        assert_eq!(fit.applied(), Some(Geometry::new(20, 100)));
        assert_eq!(fit.fit(ContainerSize::new(450, 360)), Some(Geometry::new(20, 50)));
    }

    #[test]
    fn test_resize_sequence() {
        assert_eq!(Geometry::new(24, 80).resize_sequence(), b"\x1b[8;24;80t".to_vec());
    }
}
