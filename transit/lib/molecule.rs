//! Minimal containers for molecular geometries.
//!
//! Atoms carry an element symbol, a Cartesian position, and a mass. Element
//! data is not tabulated here: [`Molecule::from_xyz`] takes a caller-supplied
//! mass lookup. All transformations return new values.

use std::cmp::Ordering;
use nalgebra::{ Matrix3, Rotation3, Unit, Vector3 };
use ndarray as nd;
use crate::{ error::GeometryError, pairwise::pairwise_array_from_func };

pub type GResult<T> = Result<T, GeometryError>;

/// A single atom.
#[derive(Clone, Debug, PartialEq)]
pub struct Atom {
    element: String,
    position: Vector3<f64>,
    mass: f64,
}

impl Atom {
    /// Create a new atom.
    ///
    /// Fails if any position component is not finite or if `mass` is not
    /// positive and finite.
    pub fn new(element: &str, position: Vector3<f64>, mass: f64) -> GResult<Self> {
        if !position.iter().all(|x| x.is_finite()) {
            return Err(GeometryError::BadPosition);
        }
        if !(mass.is_finite() && mass > 0.0) {
            return Err(GeometryError::BadMass(mass));
        }
        Ok(Self { element: element.to_string(), position, mass })
    }

    pub fn element(&self) -> &str { &self.element }

    pub fn position(&self) -> &Vector3<f64> { &self.position }

    pub fn mass(&self) -> f64 { self.mass }

    pub fn x(&self) -> f64 { self.position.x }

    pub fn y(&self) -> f64 { self.position.y }

    pub fn z(&self) -> f64 { self.position.z }

    /// Euclidean distance to another atom.
    pub fn distance(&self, other: &Self) -> f64 {
        (self.position - other.position).norm()
    }

    fn with_position(&self, position: Vector3<f64>) -> Self {
        Self { position, ..self.clone() }
    }

    /// Shift by `d`.
    pub fn translated(&self, d: &Vector3<f64>) -> Self {
        self.with_position(self.position + d)
    }

    /// Apply the linear map `r` to the position.
    pub fn rotated(&self, r: &Matrix3<f64>) -> Self {
        self.with_position(r * self.position)
    }

    /// Rotate by `angle` (radians) about the x-axis.
    pub fn rotated_about_x(&self, angle: f64) -> Self {
        self.rotated(Rotation3::from_axis_angle(&Vector3::x_axis(), angle).matrix())
    }

    /// Rotate by `angle` (radians) about the y-axis.
    pub fn rotated_about_y(&self, angle: f64) -> Self {
        self.rotated(Rotation3::from_axis_angle(&Vector3::y_axis(), angle).matrix())
    }

    /// Rotate by `angle` (radians) about the z-axis.
    pub fn rotated_about_z(&self, angle: f64) -> Self {
        self.rotated(Rotation3::from_axis_angle(&Vector3::z_axis(), angle).matrix())
    }

    /// Multiply the position by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        self.with_position(self.position * factor)
    }

    /// Mirror through the yz-plane.
    pub fn flipped_x(&self) -> Self {
        let mut position = self.position;
        position.x = -position.x;
        self.with_position(position)
    }

    /// The rotation taking the direction of this atom's position onto the
    /// direction of `target`.
    ///
    /// Fails if either vector has zero length.
    pub fn rotation_matrix_to(&self, target: &Vector3<f64>) -> GResult<Matrix3<f64>> {
        let from = Unit::try_new(self.position, f64::EPSILON)
            .ok_or(GeometryError::ZeroVector)?;
        let to = Unit::try_new(*target, f64::EPSILON)
            .ok_or(GeometryError::ZeroVector)?;
        if let Some(rot) = Rotation3::rotation_between(&from.into_inner(), &to.into_inner()) {
            return Ok(rot.into_inner());
        }
        // antiparallel: half-turn about any perpendicular axis
        let trial
            = if from.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
        let axis = Unit::new_normalize(from.cross(&trial));
        Ok(Rotation3::from_axis_angle(&axis, std::f64::consts::PI).into_inner())
    }
}

/// An ordered collection of atoms.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Molecule {
    atoms: Vec<Atom>,
}

impl FromIterator<Atom> for Molecule {
    fn from_iter<I>(iter: I) -> Self
    where I: IntoIterator<Item = Atom>
    {
        Self { atoms: iter.into_iter().collect() }
    }
}

impl Molecule {
    pub fn new(atoms: Vec<Atom>) -> Self { Self { atoms } }

    /// Parse the body of an xyz file: two header lines, then one
    /// `element x y z` record per line. Blank lines are skipped; masses come
    /// from `mass_of`.
    pub fn from_xyz<F>(text: &str, mass_of: F) -> GResult<Self>
    where F: Fn(&str) -> Option<f64>
    {
        text.lines()
            .enumerate()
            .skip(2)
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(k, line)| {
                let fields: Vec<&str> = line.split_whitespace().collect();
                let [element, x, y, z] = fields[..] else {
                    return Err(GeometryError::BadLine {
                        line: k + 1,
                        text: line.to_string(),
                    });
                };
                let parse = |s: &str| -> GResult<f64> {
                    s.parse().map_err(|_| {
                        GeometryError::BadCoord { line: k + 1, text: s.to_string() }
                    })
                };
                let position = Vector3::new(parse(x)?, parse(y)?, parse(z)?);
                let mass = mass_of(element)
                    .ok_or_else(|| GeometryError::UnknownElement(element.to_string()))?;
                Atom::new(element, position, mass)
            })
            .collect()
    }

    pub fn len(&self) -> usize { self.atoms.len() }

    pub fn is_empty(&self) -> bool { self.atoms.is_empty() }

    pub fn atoms(&self) -> &[Atom] { &self.atoms }

    pub fn iter(&self) -> std::slice::Iter<'_, Atom> { self.atoms.iter() }

    /// Positions as an `n × 3` array.
    pub fn coords(&self) -> nd::Array2<f64> {
        nd::Array2::from_shape_fn((self.atoms.len(), 3), |(i, k)| {
            self.atoms[i].position[k]
        })
    }

    /// Matrix of interatomic distances.
    pub fn distances(&self) -> nd::Array2<f64> {
        pairwise_array_from_func(&self.atoms, Atom::distance, true)
    }

    /// Total mass.
    pub fn mass(&self) -> f64 { self.atoms.iter().map(|a| a.mass).sum() }

    /// Mass-weighted mean position.
    ///
    /// Fails if the molecule has no atoms.
    pub fn center_of_mass(&self) -> GResult<Vector3<f64>> {
        let m = self.mass();
        if m <= 0.0 { return Err(GeometryError::ZeroMass); }
        let weighted: Vector3<f64>
            = self.atoms.iter()
            .map(|a| a.position * a.mass)
            .sum();
        Ok(weighted / m)
    }

    /// Apply `f` to every atom.
    pub fn map<F>(&self, f: F) -> Self
    where F: FnMut(&Atom) -> Atom
    {
        self.atoms.iter().map(f).collect()
    }

    pub fn translated(&self, d: &Vector3<f64>) -> Self {
        self.map(|a| a.translated(d))
    }

    /// Translate so that the center of mass sits at the origin.
    pub fn com_as_origin(&self) -> GResult<Self> {
        let com = self.center_of_mass()?;
        Ok(self.translated(&(-com)))
    }

    pub fn rotated(&self, r: &Matrix3<f64>) -> Self { self.map(|a| a.rotated(r)) }

    pub fn rotated_about_x(&self, angle: f64) -> Self {
        self.map(|a| a.rotated_about_x(angle))
    }

    pub fn rotated_about_y(&self, angle: f64) -> Self {
        self.map(|a| a.rotated_about_y(angle))
    }

    pub fn rotated_about_z(&self, angle: f64) -> Self {
        self.map(|a| a.rotated_about_z(angle))
    }

    pub fn scaled(&self, factor: f64) -> Self { self.map(|a| a.scaled(factor)) }

    pub fn flipped_x(&self) -> Self { self.map(Atom::flipped_x) }

    /// Reorder atoms by `compare` (stable).
    pub fn sorted_by<F>(&self, compare: F) -> Self
    where F: FnMut(&Atom, &Atom) -> Ordering
    {
        let mut atoms = self.atoms.clone();
        atoms.sort_by(compare);
        Self { atoms }
    }

    /// Rotate the whole molecule so that the atom at `index` lies along
    /// `target`.
    pub fn with_atom_aligned_to(&self, index: usize, target: &Vector3<f64>)
        -> GResult<Self>
    {
        let atom
            = self.atoms.get(index)
            .ok_or(GeometryError::BadIndex(index, self.atoms.len()))?;
        let r = atom.rotation_matrix_to(target)?;
        Ok(self.rotated(&r))
    }
}
