//! Routines to manipulate Mueller matrices for polarized rendering.
//!
//! Matrices act on Stokes vectors `[I, Q, U, V]`.

pub type MuellerMatrix = [[f64; 4]; 4];

const IDENTITY: MuellerMatrix = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Names bound in the `mueller` sub-namespace.
pub const FUNCTIONS: [&str; 6] = [
    "depolarizer",
    "absorber",
    "linear_polarizer",
    "rotator",
    "rotated_element",
    "mul",
];

/// Keeps intensity, scaled by `value`, and discards all polarization.
pub fn depolarizer(value: f64) -> MuellerMatrix {
    let mut m = [[0.0; 4]; 4];
    m[0][0] = value;
    m
}

/// Attenuates all components uniformly.
pub fn absorber(value: f64) -> MuellerMatrix {
    scale(&IDENTITY, value)
}

/// Ideal linear polarizer along the horizontal axis.
pub fn linear_polarizer(value: f64) -> MuellerMatrix {
    let h = 0.5 * value;
    [
        [h, h, 0.0, 0.0],
        [h, h, 0.0, 0.0],
        [0.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 0.0],
    ]
}

/// Rotates the reference frame of a Stokes vector by `theta` radians.
pub fn rotator(theta: f64) -> MuellerMatrix {
    let (s, c) = (2.0 * theta).sin_cos();
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, c, s, 0.0],
        [0.0, -s, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// `element` rotated about the propagation axis by `theta` radians.
pub fn rotated_element(theta: f64, element: &MuellerMatrix) -> MuellerMatrix {
    mul(&mul(&rotator(-theta), element), &rotator(theta))
}

pub fn mul(a: &MuellerMatrix, b: &MuellerMatrix) -> MuellerMatrix {
    let mut out = [[0.0; 4]; 4];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..4).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

fn scale(m: &MuellerMatrix, value: f64) -> MuellerMatrix {
    m.map(|row| row.map(|cell| cell * value))
}
