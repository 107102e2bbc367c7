//! ESG letter score derivation.
//!
//! The score starts at 100 and is adjusted by three bands:
//!
//! | input            | band          | adjustment |
//! |------------------|---------------|-----------:|
//! | total emissions  | > 50          |        -20 |
//! |                  | > 20          |        -10 |
//! | total energy     | > 10000       |        -15 |
//! |                  | > 5000        |         -8 |
//! | renewable %      | > 80          |        +10 |
//! |                  | > 50          |         +5 |
//! |                  | < 20          |        -10 |
//!
//! and the result maps to a letter: `>= 90` A, `>= 80` B, `>= 70` C,
//! `>= 60` D, otherwise E. The bands and their boundaries are part of the
//! public contract; stored reports depend on them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

const BASE_SCORE: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum EsgScore {
    A,
    B,
    C,
    D,
    E,
}

impl EsgScore {
    pub fn from_points(points: i32) -> Self {
        match points {
            p if p >= 90 => EsgScore::A,
            p if p >= 80 => EsgScore::B,
            p if p >= 70 => EsgScore::C,
            p if p >= 60 => EsgScore::D,
            _ => EsgScore::E,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EsgScore::A => "A",
            EsgScore::B => "B",
            EsgScore::C => "C",
            EsgScore::D => "D",
            EsgScore::E => "E",
        }
    }
}

impl fmt::Display for EsgScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EsgScore {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(EsgScore::A),
            "B" => Ok(EsgScore::B),
            "C" => Ok(EsgScore::C),
            "D" => Ok(EsgScore::D),
            "E" => Ok(EsgScore::E),
            other => Err(format!("'{}' is not an ESG score", other)),
        }
    }
}

/// Numeric score before letter mapping.
pub fn esg_points(total_emissions: f64, total_energy: f64, renewable_percentage: f64) -> i32 {
    let mut points = BASE_SCORE;

    if total_emissions > 50.0 {
        points -= 20;
    } else if total_emissions > 20.0 {
        points -= 10;
    }

    if total_energy > 10_000.0 {
        points -= 15;
    } else if total_energy > 5_000.0 {
        points -= 8;
    }

    if renewable_percentage > 80.0 {
        points += 10;
    } else if renewable_percentage > 50.0 {
        points += 5;
    } else if renewable_percentage < 20.0 {
        points -= 10;
    }

    points
}

pub fn derive_esg_score(total_emissions: f64, total_energy: f64, renewable_percentage: f64) -> EsgScore {
    EsgScore::from_points(esg_points(total_emissions, total_energy, renewable_percentage))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_company_scores_a() {
        assert_eq!(esg_points(15.0, 2000.0, 50.0), 100);
        assert_eq!(derive_esg_score(15.0, 2000.0, 50.0), EsgScore::A);
    }

    #[test]
    fn every_penalty_applies() {
        assert_eq!(esg_points(60.0, 12000.0, 10.0), 55);
        assert_eq!(derive_esg_score(60.0, 12000.0, 10.0), EsgScore::E);
    }

    #[test]
    fn band_boundaries_are_exclusive() {
        // Exactly on a threshold never triggers that band.
        assert_eq!(esg_points(20.0, 5000.0, 20.0), 100);
        assert_eq!(esg_points(50.0, 10000.0, 50.0), 100 - 10 - 8);
        assert_eq!(esg_points(20.01, 5000.01, 50.01), 100 - 10 - 8 + 5);
        assert_eq!(esg_points(50.01, 10000.01, 80.01), 100 - 20 - 15 + 10);
        assert_eq!(esg_points(0.0, 0.0, 80.0), 105);
        assert_eq!(esg_points(0.0, 0.0, 19.99), 90);
    }

    #[test]
    fn letter_boundaries_are_inclusive() {
        assert_eq!(EsgScore::from_points(90), EsgScore::A);
        assert_eq!(EsgScore::from_points(89), EsgScore::B);
        assert_eq!(EsgScore::from_points(80), EsgScore::B);
        assert_eq!(EsgScore::from_points(79), EsgScore::C);
        assert_eq!(EsgScore::from_points(70), EsgScore::C);
        assert_eq!(EsgScore::from_points(69), EsgScore::D);
        assert_eq!(EsgScore::from_points(60), EsgScore::D);
        assert_eq!(EsgScore::from_points(59), EsgScore::E);
        assert_eq!(EsgScore::from_points(110), EsgScore::A);
    }

    #[test]
    fn parses_only_single_letters() {
        assert_eq!("C".parse::<EsgScore>(), Ok(EsgScore::C));
        assert!("c".parse::<EsgScore>().is_err());
        assert!("AB".parse::<EsgScore>().is_err());
        assert_eq!(EsgScore::D.to_string(), "D");
    }
}
