//! Free functions exposed at the top of each render module.

/// Result of [`fresnel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FresnelTerms {
    /// Unpolarized reflectance.
    pub reflectance: f64,
    /// Cosine of the refracted direction, with the opposite sign of the incident one.
    pub cos_theta_t: f64,
    /// Relative index of refraction in the direction of travel.
    pub eta_it: f64,
    /// Relative index of refraction in the opposite direction.
    pub eta_ti: f64,
}

/// Unpolarized Fresnel reflectance of a dielectric interface.
///
/// `cos_theta_i` is measured against the surface normal; a negative value
/// means the ray arrives from the inside. `eta` is the interior over the
/// exterior index of refraction.
pub fn fresnel(cos_theta_i: f64, eta: f64) -> FresnelTerms {
    let outside = cos_theta_i >= 0.0;
    let (eta_it, eta_ti) = if outside {
        (eta, 1.0 / eta)
    } else {
        (1.0 / eta, eta)
    };

    let cos_theta_t_sqr = 1.0 - eta_ti * eta_ti * (1.0 - cos_theta_i * cos_theta_i);
    let cos_i = cos_theta_i.abs();
    let cos_t = cos_theta_t_sqr.max(0.0).sqrt();

    let index_matched = eta == 1.0;
    let reflectance = if index_matched {
        0.0
    } else if cos_i == 0.0 {
        1.0
    } else {
        let a_s = (cos_i - eta_it * cos_t) / (cos_i + eta_it * cos_t);
        let a_p = (cos_t - eta_it * cos_i) / (cos_t + eta_it * cos_i);
        0.5 * (a_s * a_s + a_p * a_p)
    };

    FresnelTerms {
        reflectance,
        cos_theta_t: if outside { -cos_t } else { cos_t },
        eta_it,
        eta_ti,
    }
}

/// sRGB transfer function: encoded value to linear.
pub fn srgb_to_linear(value: f64) -> f64 {
    if value <= 0.04045 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

/// Inverse sRGB transfer function: linear value to encoded.
pub fn linear_to_srgb(value: f64) -> f64 {
    if value <= 0.003_130_8 {
        value * 12.92
    } else {
        1.055 * value.powf(1.0 / 2.4) - 0.055
    }
}

/// Linear sRGB to luminance (Y of CIE XYZ).
pub fn luminance(rgb: [f64; 3]) -> f64 {
    0.212_671 * rgb[0] + 0.715_160 * rgb[1] + 0.072_169 * rgb[2]
}
