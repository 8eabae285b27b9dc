//! Primitive chemistry and geometry types shared across the crate.
//!
//! The kit only ever deals with the twelve elements players can pull out of a bucket, so the
//! [`Element`] enum is closed over that set and carries the per-element constants the
//! bonding engine needs (covalent radius, electronegativity, atomic weight). Positions are
//! 2D `nalgebra` points; [`Bounds`] is the axis-aligned rectangle used by the separation
//! solver, and [`Direction`] enumerates the four Lewis-dot bond slots.

use nalgebra::{Point2, Vector2};
use std::fmt;
use std::str::FromStr;

pub type Point = Point2<f64>;
pub type Vector = Vector2<f64>;

/// Chemical elements supported by the construction kit.
///
/// Variants are declared in ascending atomic number; that order is also the canonical order
/// used by histogram hash strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Element {
    H = 1,
    B = 5,
    C = 6,
    N = 7,
    O = 8,
    F = 9,
    Si = 14,
    P = 15,
    S = 16,
    Cl = 17,
    Br = 35,
    I = 53,
}

/// Bond multiplicity recorded for reference molecules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
}

/// One of the four bond slots around an atom in the Lewis-dot lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Element {
    /// Number of supported elements.
    pub const COUNT: usize = 12;

    /// Every supported element in canonical order.
    pub const ALL: [Element; Element::COUNT] = [
        Element::H,
        Element::B,
        Element::C,
        Element::N,
        Element::O,
        Element::F,
        Element::Si,
        Element::P,
        Element::S,
        Element::Cl,
        Element::Br,
        Element::I,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Element::H => "H",
            Element::B => "B",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::F => "F",
            Element::Si => "Si",
            Element::P => "P",
            Element::S => "S",
            Element::Cl => "Cl",
            Element::Br => "Br",
            Element::I => "I",
        }
    }

    pub fn atomic_number(&self) -> u8 {
        *self as u8
    }

    /// Position of the element inside [`Element::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Element::H => 0,
            Element::B => 1,
            Element::C => 2,
            Element::N => 3,
            Element::O => 4,
            Element::F => 5,
            Element::Si => 6,
            Element::P => 7,
            Element::S => 8,
            Element::Cl => 9,
            Element::Br => 10,
            Element::I => 11,
        }
    }

    /// Covalent radius in picometers; the kit uses these as model-space units.
    pub fn covalent_radius(&self) -> f64 {
        match self {
            Element::H => 37.0,
            Element::B => 82.0,
            Element::C => 77.0,
            Element::N => 75.0,
            Element::O => 73.0,
            Element::F => 71.0,
            Element::Si => 111.0,
            Element::P => 106.0,
            Element::S => 102.0,
            Element::Cl => 99.0,
            Element::Br => 114.0,
            Element::I => 133.0,
        }
    }

    /// Pauling electronegativity.
    pub fn electronegativity(&self) -> f64 {
        match self {
            Element::H => 2.20,
            Element::B => 2.04,
            Element::C => 2.55,
            Element::N => 3.04,
            Element::O => 3.44,
            Element::F => 3.98,
            Element::Si => 1.90,
            Element::P => 2.19,
            Element::S => 2.58,
            Element::Cl => 3.16,
            Element::Br => 2.96,
            Element::I => 2.66,
        }
    }

    /// Standard atomic weight in daltons.
    pub fn atomic_weight(&self) -> f64 {
        match self {
            Element::H => 1.00794,
            Element::B => 10.811,
            Element::C => 12.0107,
            Element::N => 14.0067,
            Element::O => 15.9994,
            Element::F => 18.9984032,
            Element::Si => 28.0855,
            Element::P => 30.973762,
            Element::S => 32.065,
            Element::Cl => 35.453,
            Element::Br => 79.904,
            Element::I => 126.90447,
        }
    }

    pub fn is_hydrogen(&self) -> bool {
        matches!(self, Element::H)
    }

    pub fn is_heavy_atom(&self) -> bool {
        !self.is_hydrogen()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Element {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Element::ALL
            .iter()
            .copied()
            .find(|e| e.symbol() == s)
            .ok_or_else(|| format!("Unsupported element: {}", s))
    }
}

impl BondOrder {
    pub fn value(&self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl FromStr for BondOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" | "Single" => Ok(BondOrder::Single),
            "2" | "Double" => Ok(BondOrder::Double),
            "3" | "Triple" => Ok(BondOrder::Triple),
            _ => Err(format!("Invalid bond order: {}", s)),
        }
    }
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Integer lattice offset of one step in this direction.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }

    /// Unit vector pointing in this direction.
    pub fn vector(&self) -> Vector {
        let (x, y) = self.offset();
        Vector::new(x as f64, y as f64)
    }

    pub(crate) fn slot(&self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Direction::North => "North",
            Direction::East => "East",
            Direction::South => "South",
            Direction::West => "West",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Axis-aligned rectangle in model coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Rectangle enclosing a circle.
    pub fn around(center: &Point, radius: f64) -> Self {
        let r = Vector::new(radius, radius);
        Self {
            min: center - r,
            max: center + r,
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Grows the rectangle by `amount` on every side.
    pub fn dilated(&self, amount: f64) -> Bounds {
        let d = Vector::new(amount, amount);
        Bounds {
            min: self.min - d,
            max: self.max + d,
        }
    }

    pub fn shifted(&self, delta: &Vector) -> Bounds {
        Bounds {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Strict overlap test; rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    pub fn contains_bounds(&self, other: &Bounds) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
    }

    pub fn contains_point(&self, point: &Point) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}
