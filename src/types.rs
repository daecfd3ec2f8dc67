use nalgebra_glm as glm;

/// A 4x4 matrix as handed over by the import side. Always row-major, so
/// `m[row][col]`, with the translation in column 3.
pub type RowMatrix = [[f32; 4]; 4];

/// Identity in `RowMatrix` form
pub const IDENTITY_ROWS: RowMatrix = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Converts seconds of source time to the microseconds used by all bound
/// animation data
pub const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Transcribes a row-major import matrix into a `glm::Mat4` so that
/// `mat[(r, c)] == rows[r][c]` for every component.
#[must_use]
pub fn mat4_from_rows(rows: &RowMatrix) -> glm::Mat4 {
    glm::Mat4::from_fn(|r, c| rows[r][c])
}

/// Converts a column-major array (as used by glTF) to `RowMatrix`
#[must_use]
pub fn rows_from_columns(columns: &[[f32; 4]; 4]) -> RowMatrix {
    std::array::from_fn(|r| std::array::from_fn(|c| columns[c][r]))
}

/// Exact comparison against the identity, matching what an importer would
/// consider an untransformed node
#[must_use]
#[allow(clippy::float_cmp)]
pub fn is_identity(rows: &RowMatrix) -> bool {
    *rows == IDENTITY_ROWS
}
