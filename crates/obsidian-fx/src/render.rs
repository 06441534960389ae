#![forbid(unsafe_code)]

//! Drawing capability for point clouds, plus a character-cell surface.
//!
//! Effects know nothing about how points end up on screen: they hand a
//! slice of model-space points and a transform to a [`PointSurface`].
//! [`AsciiSurface`] projects through a fixed perspective camera and keeps a
//! hit count per cell, rendered as a density ramp.

use glam::{Mat4, Vec3};

/// Something that can draw 3D points.
pub trait PointSurface {
    /// Draw `points` after applying `transform`.
    fn draw_points(&mut self, points: &[Vec3], transform: Mat4);

    /// Draw a straight segment between two world-space points.
    fn draw_segment(&mut self, a: Vec3, b: Vec3) {
        const SAMPLES: usize = 24;
        let pts: Vec<Vec3> = (0..=SAMPLES)
            .map(|i| a.lerp(b, i as f32 / SAMPLES as f32))
            .collect();
        self.draw_points(&pts, Mat4::IDENTITY);
    }
}

/// Camera distance from the origin along +Z.
pub const CAMERA_Z: f32 = 10.0;

/// Vertical field of view in degrees.
pub const CAMERA_FOV_DEG: f32 = 45.0;

const NEAR: f32 = 0.1;
const FAR: f32 = 1000.0;

/// Density ramp, sparse to dense.
const RAMP: &[u8] = b" .:-=+*#%@";

/// Character cells are roughly twice as tall as wide.
const CELL_ASPECT: f32 = 0.5;

/// Grid of hit counters viewed through a perspective camera.
#[derive(Debug, Clone)]
pub struct AsciiSurface {
    width: usize,
    height: usize,
    hits: Vec<u16>,
    view_proj: Mat4,
    plotted: usize,
    culled: usize,
}

impl AsciiSurface {
    /// Empty surface of `width` x `height` cells. Zero sizes are bumped to 1.
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let aspect = width as f32 * CELL_ASPECT / height as f32;
        let proj = Mat4::perspective_rh_gl(CAMERA_FOV_DEG.to_radians(), aspect, NEAR, FAR);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, CAMERA_Z), Vec3::ZERO, Vec3::Y);
        Self {
            width,
            height,
            hits: vec![0; width * height],
            view_proj: proj * view,
            plotted: 0,
            culled: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Points that landed on a cell since the last clear.
    pub fn plotted(&self) -> usize {
        self.plotted
    }

    /// Points behind the camera or outside the frustum.
    pub fn culled(&self) -> usize {
        self.culled
    }

    pub fn clear(&mut self) {
        self.hits.fill(0);
        self.plotted = 0;
        self.culled = 0;
    }

    /// Cell of a world-space point, if visible.
    pub fn project(&self, world: Vec3) -> Option<(usize, usize)> {
        let clip = self.view_proj * world.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if [ndc.x, ndc.y, ndc.z].iter().any(|c| !(-1.0..=1.0).contains(c)) {
            return None;
        }
        let col = ((ndc.x + 1.0) * 0.5 * self.width as f32) as usize;
        let row = ((1.0 - ndc.y) * 0.5 * self.height as f32) as usize;
        Some((col.min(self.width - 1), row.min(self.height - 1)))
    }

    /// Hit count of a cell.
    pub fn hits(&self, col: usize, row: usize) -> u16 {
        if col >= self.width || row >= self.height {
            return 0;
        }
        self.hits[row * self.width + col]
    }

    /// One string per row.
    pub fn lines(&self) -> Vec<String> {
        let peak = self.hits.iter().copied().max().unwrap_or(0);
        let span = usize::from(peak.saturating_sub(1)).max(1);
        self.hits
            .chunks(self.width)
            .map(|row| {
                row.iter()
                    .map(|&h| {
                        if h == 0 {
                            ' '
                        } else {
                            let idx = 1 + (usize::from(h) - 1) * (RAMP.len() - 2) / span;
                            char::from(RAMP[idx.min(RAMP.len() - 1)])
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// Rows joined with newlines.
    pub fn render(&self) -> String {
        self.lines().join("\n")
    }
}

impl PointSurface for AsciiSurface {
    fn draw_points(&mut self, points: &[Vec3], transform: Mat4) {
        for &p in points {
            match self.project(transform.transform_point3(p)) {
                Some((col, row)) => {
                    let cell = &mut self.hits[row * self.width + col];
                    *cell = cell.saturating_add(1);
                    self.plotted += 1;
                }
                None => self.culled += 1,
            }
        }
    }
}
