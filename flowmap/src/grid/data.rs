use nalgebra::Vector2;

/// Integer index of a grid cell. Signed, as positions mapped from the world may fall left of or
/// below the grid origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Dense storage of one value per cell.
#[derive(Clone, Debug)]
pub struct GridData<T> {
    /** the size of the grid in cells */
    size: Vector2<usize>,

    /// Vector containing all the data values
    data: Vec<T>,
}

impl<T> GridData<T> {
    /// Creates a grid of the given size, calling `f` once for every cell.
    pub fn new_with(size: Vector2<usize>, mut f: impl FnMut() -> T) -> Self {
        Self {
            size,
            data: (0..size.x * size.y).map(|_| f()).collect(),
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0
            && cell.y >= 0
            && (cell.x as usize) < self.size.x
            && (cell.y as usize) < self.size.y
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        // Row-major order
        self.contains(cell)
            .then(|| cell.y as usize * self.size.x + cell.x as usize)
    }

    fn cell(&self, index: usize) -> Cell {
        // Row-major order
        debug_assert!(index < self.size.x * self.size.y);

        Cell {
            x: (index % self.size.x) as i32,
            y: (index / self.size.x) as i32,
        }
    }

    pub fn get(&self, cell: Cell) -> Option<&T> {
        self.index(cell).map(|i| &self.data[i])
    }

    pub fn get_mut(&mut self, cell: Cell) -> Option<&mut T> {
        let index = self.index(cell)?;
        Some(&mut self.data[index])
    }

    /// Returns a copy of this GridData with each element converted to `S` using the provided function.
    pub fn transform_map<S>(&self, f: impl Fn(&T) -> S) -> GridData<S> {
        GridData {
            size: self.size,
            data: self.data.iter().map(f).collect(),
        }
    }

    pub fn iter_cells(&self) -> impl Iterator<Item = (Cell, &T)> {
        self.data.iter().enumerate().map(|(i, v)| (self.cell(i), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    pub fn size(&self) -> Vector2<usize> {
        self.size
    }
}

impl<T: Clone> GridData<T> {
    pub fn new_fill(size: Vector2<usize>, initial_value: T) -> Self {
        Self {
            size,
            data: vec![initial_value; size.x * size.y],
        }
    }
}
