//! Layout algorithm families and their tunable knobs.
//!
//! Each family names a Cytoscape layout and carries two property sets: the
//! knobs the study searches over (with their ranges) and the properties that
//! stay fixed for every trial. Ranges are twice the Cytoscape defaults.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::training::{ParamRange, ParameterPoint, SearchSpace};
use crate::types::LayoutProperty;

/// A layout algorithm family exposed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutFamily {
    /// Edge-weighted spring embedded (stress majorization)
    #[value(name = "kamada-kawai")]
    KamadaKawai,
    /// Force-directed Fruchterman-Reingold
    #[default]
    #[value(name = "fruchterman-rheingold")]
    FruchtermanRheingold,
}

impl LayoutFamily {
    /// Layout name in the engine's `/apply/layouts/{name}` namespace.
    pub fn engine_name(self) -> &'static str {
        match self {
            Self::KamadaKawai => "kamada-kawai",
            Self::FruchtermanRheingold => "fruchterman-rheingold",
        }
    }

    /// Tuned knobs and their ranges.
    pub fn search_space(self) -> SearchSpace {
        let knobs: &[(&str, f64)] = match self {
            Self::KamadaKawai => &[
                ("m_averageIterationsPerNode", 150.0),
                ("m_nodeDistanceStrengthConstant", 50.0),
                ("m_nodeDistanceRestLengthConstant", 100.0),
                ("m_disconnectedNodeDistanceSpringStrength", 1.0),
                ("m_disconnectedNodeDistanceSpringRestLength", 10000.0),
                ("m_anticollisionSpringStrength", 1.0),
            ],
            Self::FruchtermanRheingold => &[
                ("attraction_multiplier", 0.03 * 2.0),
                ("repulsion_multiplier", 0.04 * 2.0),
                ("gravity_multiplier", 1.0 * 2.0),
                ("conflict_avoidance", 20.0 * 2.0),
                ("max_distance_factor", 20.0 * 2.0),
                ("spread_factor", 2.0 * 2.0),
                ("temperature", 80.0 * 2.0),
            ],
        };

        knobs
            .iter()
            .fold(SearchSpace::new(), |space, &(name, max)| {
                space.with(name, ParamRange::linear(0.0, max))
            })
    }

    /// Properties sent unchanged with every trial.
    pub fn fixed_properties(self) -> Vec<LayoutProperty> {
        match self {
            Self::KamadaKawai => vec![
                LayoutProperty::new("m_layoutPass", 0),
                LayoutProperty::new("singlePartition", false),
                LayoutProperty::new("unweighted", false),
                LayoutProperty::new("randomize", false),
            ],
            Self::FruchtermanRheingold => vec![
                LayoutProperty::new("update_iterations", 0),
                LayoutProperty::new("nIterations", 500),
                LayoutProperty::new("singlePartition", false),
                LayoutProperty::new("layout3D", false),
                LayoutProperty::new("randomize", false),
            ],
        }
    }

    /// Full property list for one trial: tuned values first, then fixed ones.
    pub fn properties(self, point: &ParameterPoint) -> Vec<LayoutProperty> {
        point
            .iter()
            .map(|(name, value)| LayoutProperty::new(name, value))
            .chain(self.fixed_properties())
            .collect()
    }
}

impl fmt::Display for LayoutFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.engine_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_names() {
        assert_eq!(LayoutFamily::KamadaKawai.engine_name(), "kamada-kawai");
        assert_eq!(
            LayoutFamily::FruchtermanRheingold.to_string(),
            "fruchterman-rheingold"
        );
        assert_eq!(LayoutFamily::default(), LayoutFamily::FruchtermanRheingold);
    }

    #[test]
    fn test_search_spaces() {
        let kk = LayoutFamily::KamadaKawai.search_space();
        assert_eq!(kk.ndim(), 6);
        assert_eq!(
            kk.ranges["m_disconnectedNodeDistanceSpringRestLength"],
            ParamRange::linear(0.0, 10000.0)
        );

        let fr = LayoutFamily::FruchtermanRheingold.search_space();
        assert_eq!(fr.ndim(), 7);
        assert_eq!(fr.ranges["temperature"], ParamRange::linear(0.0, 160.0));
        assert!((fr.ranges["attraction_multiplier"].max - 0.06).abs() < 1e-12);
    }

    #[test]
    fn test_fixed_and_tuned_do_not_overlap() {
        for family in [LayoutFamily::KamadaKawai, LayoutFamily::FruchtermanRheingold] {
            let space = family.search_space();
            for prop in family.fixed_properties() {
                assert!(!space.ranges.contains_key(&prop.name), "{}", prop.name);
            }
        }
    }

    #[test]
    fn test_properties_merge() {
        let family = LayoutFamily::FruchtermanRheingold;
        let point = family.search_space().decode(&[0.5; 7]);
        let props = family.properties(&point);
        assert_eq!(props.len(), 7 + 5);
        let n_iter = props.iter().find(|p| p.name == "nIterations").unwrap();
        assert_eq!(n_iter.value, serde_json::json!(500));
        let temp = props.iter().find(|p| p.name == "temperature").unwrap();
        assert_eq!(temp.value, serde_json::json!(80.0));
    }

    #[test]
    fn test_family_deserializes_from_config_names() {
        #[derive(Deserialize)]
        struct Wrap {
            layout: LayoutFamily,
        }
        let w: Wrap = toml::from_str(r#"layout = "kamada-kawai""#).unwrap();
        assert_eq!(w.layout, LayoutFamily::KamadaKawai);
        let w: Wrap = toml::from_str(r#"layout = "fruchterman-rheingold""#).unwrap();
        assert_eq!(w.layout, LayoutFamily::FruchtermanRheingold);
    }
}
