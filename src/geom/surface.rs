//! Renderer-neutral surface geometry built from decoded tables.

use crate::core::{Series, Table, INDICES, POSITIONS};
use crate::util::{BBox3f, ElementKind, Error, Result, Vec3};
use rayon::prelude::*;

/// Post-processing options for [`build_geometries`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GeometryOptions {
    /// Translate all geometries so the mean of their bounding-box centers
    /// sits at the origin.
    pub center: bool,
}

/// Triangle surface ready for upload.
#[derive(Clone, Debug)]
pub struct SurfaceGeometry {
    pub name: String,
    pub positions: Vec<Vec3>,
    /// Triangle corners, three per face. Empty for point-only tables.
    pub indices: Vec<u32>,
    /// Area-weighted vertex normals.
    pub normals: Vec<Vec3>,
    pub bounds: BBox3f,
}

impl SurfaceGeometry {
    /// Build geometry from the `positions` and `indices` columns of a table.
    pub fn from_table(table: &Table) -> Result<Self> {
        let positions = table
            .positions()
            .ok_or_else(|| Error::MissingColumn(POSITIONS.to_string()))?;
        let positions = read_positions(positions)?;

        let indices = match table.indices() {
            Some(series) => read_indices(series, positions.len())?,
            None => Vec::new(),
        };

        let normals = vertex_normals(&positions, &indices);
        let bounds = BBox3f::from_points(&positions);

        Ok(Self {
            name: table.name().unwrap_or_default().to_string(),
            positions,
            indices,
            normals,
            bounds,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Radius of the bounding sphere around the bounding-box center.
    pub fn bounding_radius(&self) -> f32 {
        self.bounds.radius()
    }

    /// Move every position by `offset`.
    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p += offset;
        }
        self.bounds = self.bounds.translated(offset);
    }
}

/// Build one geometry per table, in parallel, optionally recentered.
pub fn build_geometries(tables: &[Table], options: &GeometryOptions) -> Result<Vec<SurfaceGeometry>> {
    let mut geometries = tables
        .par_iter()
        .map(SurfaceGeometry::from_table)
        .collect::<Result<Vec<_>>>()?;

    if options.center && !geometries.is_empty() {
        let barycenter = geometries.iter().map(|g| g.bounds.center()).sum::<Vec3>() / geometries.len() as f32;
        tracing::debug!(?barycenter, "recentering geometries");
        for g in &mut geometries {
            g.translate(-barycenter);
        }
    }
    Ok(geometries)
}

fn read_positions(series: &Series) -> Result<Vec<Vec3>> {
    if series.item_size() != 3 {
        return Err(Error::shape(3, series.item_size()));
    }
    if series.kind() == ElementKind::Float32 {
        let values = series.read::<f32>()?;
        return Ok(bytemuck::cast_slice::<f32, Vec3>(&values[..]).to_vec());
    }
    Ok(series
        .to_f64_vec()
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0] as f32, c[1] as f32, c[2] as f32))
        .collect())
}

fn read_indices(series: &Series, vertex_count: usize) -> Result<Vec<u32>> {
    if series.item_size() != 3 {
        return Err(Error::shape(3, series.item_size()));
    }
    let indices: Vec<u32> = match series.kind() {
        ElementKind::Uint16 => series.read::<u16>()?.iter().map(|&i| u32::from(i)).collect(),
        ElementKind::Uint32 => series.buffer().to_vec::<u32>()?,
        _ => series.to_f64_vec().into_iter().map(|i| i as u32).collect(),
    };
    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        tracing::warn!(column = INDICES, index = bad, vertex_count, "index past last vertex");
        return Err(Error::out_of_range(bad as usize, vertex_count));
    }
    Ok(indices)
}

fn vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        // unnormalized, weighted by twice the face area
        let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }
    for n in &mut normals {
        *n = n.normalize_or_zero();
    }
    normals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Allocation, UserData};

    fn quad(offset: f32, with_indices: bool) -> Table {
        let positions = vec![
            offset, 0.0, 0.0,
            offset + 1.0, 0.0, 0.0,
            offset + 1.0, 1.0, 0.0,
            offset, 1.0, 0.0,
        ];
        let mut columns = vec![(POSITIONS, Series::from_vec(positions, 3, Allocation::Local).unwrap())];
        if with_indices {
            columns.push((INDICES, Series::from_vec(vec![0u16, 1, 2, 0, 2, 3], 3, Allocation::Local).unwrap()));
        }
        let mut user_data = UserData::new();
        user_data.set(UserData::NAME_KEY, "quad");
        Table::new(columns, user_data).unwrap()
    }

    #[test]
    fn test_from_table() {
        let g = SurfaceGeometry::from_table(&quad(0.0, true)).unwrap();
        assert_eq!(g.name, "quad");
        assert_eq!(g.vertex_count(), 4);
        assert_eq!(g.triangle_count(), 2);
        assert_eq!(g.indices, vec![0, 1, 2, 0, 2, 3]);
        for n in &g.normals {
            assert!((*n - Vec3::Z).length() < 1e-6);
        }
        assert_eq!(g.bounds.center(), Vec3::new(0.5, 0.5, 0.0));
        assert!((g.bounding_radius() - 0.5f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_points_only() {
        let g = SurfaceGeometry::from_table(&quad(0.0, false)).unwrap();
        assert_eq!(g.triangle_count(), 0);
        assert!(g.normals.iter().all(|n| *n == Vec3::ZERO));
    }

    #[test]
    fn test_missing_positions() {
        let err = SurfaceGeometry::from_table(&Table::default()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(ref c) if c == POSITIONS));
    }

    #[test]
    fn test_index_past_end() {
        let table = Table::new(
            [
                (POSITIONS, Series::from_vec(vec![0.0f32; 9], 3, Allocation::Local).unwrap()),
                (INDICES, Series::from_vec(vec![0u32, 1, 3], 3, Allocation::Local).unwrap()),
            ],
            UserData::new(),
        )
        .unwrap();
        let err = SurfaceGeometry::from_table(&table).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 3, count: 3 }));
    }

    #[test]
    fn test_build_centered() {
        let tables = vec![quad(0.0, true), quad(4.0, true)];
        let plain = build_geometries(&tables, &GeometryOptions::default()).unwrap();
        assert_eq!(plain[1].bounds.center(), Vec3::new(4.5, 0.5, 0.0));

        let centered = build_geometries(&tables, &GeometryOptions { center: true }).unwrap();
        let mean = (centered[0].bounds.center() + centered[1].bounds.center()) * 0.5;
        assert!(mean.length() < 1e-6);
        assert_eq!(centered[0].positions[0], Vec3::new(-2.5, -0.5, 0.0));
    }
}
