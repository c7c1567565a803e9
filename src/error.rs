use thiserror::Error;

/// Library error types
#[derive(Debug, Error)]
pub enum RaceCardError {
    /// None of the configured encodings decoded the input cleanly
    #[error("Could not decode input with any of: {tried}")]
    Decode { tried: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Invalid user-supplied data
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Validation functions
pub fn validate_post_position(post: u32, max_post: u32) -> Result<(), RaceCardError> {
    if !(1..=max_post).contains(&post) {
        return Err(RaceCardError::Validation(format!(
            "Post position must be between 1 and {}, got {}",
            max_post, post
        )));
    }
    Ok(())
}

pub fn validate_speed_figure(speed: f64) -> Result<(), RaceCardError> {
    if !(50.0..=120.0).contains(&speed) {
        return Err(RaceCardError::Validation(format!(
            "Speed figure must be between 50 and 120, got {}",
            speed
        )));
    }
    Ok(())
}

pub fn validate_form_rating(rating: u8) -> Result<(), RaceCardError> {
    if !(1..=10).contains(&rating) {
        return Err(RaceCardError::Validation(format!(
            "Form rating must be between 1 and 10, got {}",
            rating
        )));
    }
    Ok(())
}

pub fn validate_distance(furlongs: f64) -> Result<(), RaceCardError> {
    if !furlongs.is_finite() || furlongs <= 0.0 {
        return Err(RaceCardError::Validation(format!(
            "Distance must be a positive number of furlongs, got {}",
            furlongs
        )));
    }
    Ok(())
}

pub fn validate_field_size(size: usize, max_entrants: usize) -> Result<(), RaceCardError> {
    if size == 0 || size > max_entrants {
        return Err(RaceCardError::Validation(format!(
            "Field size must be between 1 and {}, got {}",
            max_entrants, size
        )));
    }
    Ok(())
}
