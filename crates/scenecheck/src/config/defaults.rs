//! Built-in bindings for the ODD annotation export.

use indexmap::IndexMap;

use super::{EngineConfig, NormalizationConfig, SmoothingConfig, Thresholds};
use crate::rules::{CheckGroup, RuleSet, RuleSpec};
use crate::schema::FieldSpec;

const DRIVABLE: &str = "Scenery.DrivableArea";
const ENV: &str = "EnvironmentalConditions";

/// Binary fields smoothed scene-wise, with their column paths.
const SMOOTHED_BINARY: &[(&str, &str)] = &[
    ("SchoolZones", "Scenery.Zones.SchoolZones"),
    ("Parking", "Scenery.DrivableArea.DrivableAreaType.Parking"),
    ("SharedSpace", "Scenery.DrivableArea.DrivableAreaType.SharedSpace"),
    ("Pavements", "Scenery.DrivableArea.DrivableAreaGeometry.TransversePlane.Pavements"),
    ("BarriersOnEdges", "Scenery.DrivableArea.DrivableAreaGeometry.TransversePlane.BarriersOnEdges"),
    ("LaneNarrow", "Scenery.DrivableArea.LaneSpecification.LaneNarrow"),
    ("LineMarkers", "Scenery.DrivableArea.DrivableAreaEdge.LineMarkers"),
    ("ShoulderPaved", "Scenery.DrivableArea.DrivableAreaEdge.ShoulderPaved"),
    ("ShoulderGrass", "Scenery.DrivableArea.DrivableAreaEdge.ShoulderGrass"),
    ("SolidBarriers", "Scenery.DrivableArea.DrivableAreaEdge.SolidBarriers"),
    ("Cracks", "Scenery.DrivableArea.DrivableAreaSurface.SurfaceFeatures.Cracks"),
    ("Potholes", "Scenery.DrivableArea.DrivableAreaSurface.SurfaceFeatures.Potholes"),
    ("Ruts", "Scenery.DrivableArea.DrivableAreaSurface.SurfaceFeatures.Ruts"),
    ("Swells", "Scenery.DrivableArea.DrivableAreaSurface.Features.Swells"),
    ("StandingWater", "Scenery.DrivableArea.DrivableAreaSurface.InducedSurfaceConditions.StandingWater"),
    ("WetRoad", "Scenery.DrivableArea.DrivableAreaSurface.InducedSurfaceConditions.WetRoad"),
    (
        "SurfaceContamination",
        "Scenery.DrivableArea.DrivableAreaSurface.InducedSurfaceConditions.SurfaceContamination",
    ),
    ("AutomaticAccessControl", "Scenery.SpecialStructures.AutomaticAccessControl"),
    ("PedestrianCrossings", "Scenery.SpecialStructures.PedestrianCrossings"),
    ("RailCrossings", "Scenery.SpecialStructures.RailCrossings"),
    ("Buildings", "Scenery.FixedRoadStructures.Buildings"),
    ("StreetLights", "Scenery.FixedRoadStructures.StreetLights"),
    ("StreetFurniture", "Scenery.FixedRoadStructures.StreetFurniture"),
    ("Vegetation", "Scenery.FixedRoadStructures.Vegetation"),
    ("ConstructionSiteDetours", "Scenery.TemporaryRoadStructures.ConstructionSiteDetours"),
    ("Divided", "Scenery.DrivableArea.DrivableAreaGeometry.TransversePlane.Divided"),
    ("Undivided", "Scenery.DrivableArea.DrivableAreaGeometry.TransversePlane.Undivided"),
    ("RoadWorks", "Scenery.TemporaryRoadStructures.RoadWorks"),
    ("TemporaryRoadSignage", "Scenery.TemporaryRoadStructures.TemporaryRoadSignage"),
    ("TemporaryLineMarkers", "Scenery.DrivableArea.DrivableAreaEdge.TemporaryLineMarkers"),
    ("Day", "EnvironmentalConditions.Illumination.Day"),
    ("Night", "EnvironmentalConditions.Illumination.Night"),
];

/// Binary fields that are normalized and checked but not smoothed.
const UNSMOOTHED_BINARY: &[(&str, &str)] = &[
    ("RegionsOrStates", "Scenery.Zones.RegionsOrStates"),
    ("DistributorRoads", "Scenery.DrivableArea.DrivableAreaType.DistributorRoads"),
];

/// Conditions outside the operational design domain of the recordings.
const FORCED_NO: &[&str] = &[
    "EnvironmentalConditions.Weather.Snowfall.Visibility",
    "Scenery.SpecialStructures.Tunnels",
    "Scenery.SpecialStructures.TollPlaza",
    "Scenery.DrivableArea.LaneSpecification.LaneType.TramLane",
    "Scenery.DrivableArea.LaneSpecification.LaneType.EmergencyLane",
    "Scenery.DrivableArea.DrivableAreaType.Motorways",
    "Scenery.DrivableArea.DrivableAreaType.RadialRoads",
    "EnvironmentalConditions.Particulates.VolcanicAsh",
    "EnvironmentalConditions.Particulates.SmokeAndPollution",
    "EnvironmentalConditions.Particulates.SandAndDust",
    "EnvironmentalConditions.Particulates.NonPrecipitatingWaterDroplets",
    "EnvironmentalConditions.Particulates.Marine",
    "EnvironmentalConditions.Illumination.ArtificialIllumination",
];

/// Per-state binary fields over the one-hot Cloudiness columns.
const CLOUDINESS_STATES: &[&str] = &["CloudinessClear", "CloudinessPartlyCloudy", "CloudinessOvercast"];

/// Sign categories whose list must line up with its times of operation.
const SIGN_KINDS: &[&str] = &["RegulatorySigns", "WarningSigns", "InformationSigns"];

impl EngineConfig {
    /// Configuration for the ODD annotation export column layout.
    pub fn odd_defaults() -> Self {
        let mut fields = IndexMap::new();

        for (name, column) in SMOOTHED_BINARY.iter().chain(UNSMOOTHED_BINARY) {
            fields.insert(name.to_string(), FieldSpec::binary(*column));
        }

        fields.insert(
            "NumberOfLanes".to_string(),
            FieldSpec::numeric(format!("{DRIVABLE}.LaneSpecification.NumberOfLanes")),
        );
        fields.insert(
            "HorizontalPlane".to_string(),
            FieldSpec::categorical(
                format!("{DRIVABLE}.DrivableAreaGeometry.HorizontalPlane"),
                &["Straight", "Curved"],
            ),
        );
        fields.insert(
            "DensityOfAgents".to_string(),
            FieldSpec::categorical(
                "DynamicElements.Traffic.DensityOfAgents",
                &["Low", "Medium", "High"],
            )
            .with_synonym("Moderate", "Medium"),
        );
        fields.insert(
            "RainfallVisibility".to_string(),
            FieldSpec::categorical(
                format!("{ENV}.Weather.Rainfall.Visibility"),
                &["No", "LightRain", "ModerateRain", "HeavyRain"],
            )
            .with_synonym("Light", "LightRain")
            .with_synonym("Moderate", "ModerateRain")
            .with_synonym("LightRain, ModerateRain, HeavyRain", "No"),
        );
        let clear = format!("{ENV}.Weather.Cloudiness.Clear");
        let partly = format!("{ENV}.Weather.Cloudiness.PartlyCloudy");
        let overcast = format!("{ENV}.Weather.Cloudiness.Overcast");
        fields.insert(
            "Cloudiness".to_string(),
            FieldSpec::one_hot(&[
                ("Clear", clear.as_str()),
                ("PartlyCloudy", partly.as_str()),
                ("Overcast", overcast.as_str()),
            ]),
        );
        // Each state column is also smoothed on its own, so single-frame
        // zig-zags are gone before the exclusivity and transition checks.
        for (state, column) in [("Clear", &clear), ("PartlyCloudy", &partly), ("Overcast", &overcast)] {
            fields.insert(format!("Cloudiness{state}"), FieldSpec::binary(column.as_str()));
        }
        for kind in SIGN_KINDS {
            let base = format!("{DRIVABLE}.DrivableAreaSigns.{kind}");
            fields.insert(kind.to_string(), FieldSpec::list(format!("{base}.Signs")));
            fields.insert(
                format!("{kind}Times"),
                FieldSpec::list(format!("{base}.TimeOfOperation")),
            );
        }

        let mut smoothed: Vec<String> = SMOOTHED_BINARY.iter().map(|(n, _)| n.to_string()).collect();
        smoothed.push("NumberOfLanes".to_string());
        smoothed.push("HorizontalPlane".to_string());
        smoothed.extend(CLOUDINESS_STATES.iter().map(|f| f.to_string()));

        let mut overrides = IndexMap::new();
        overrides.insert("Divided".to_string(), Thresholds::new(2, 4));
        overrides.insert("Undivided".to_string(), Thresholds::new(2, 4));
        overrides.insert("HorizontalPlane".to_string(), Thresholds::new(4, 6));
        for field in CLOUDINESS_STATES {
            overrides.insert(field.to_string(), Thresholds::new(2, 2));
        }

        let mut prerequisites = IndexMap::new();
        prerequisites.insert("StandingWater".to_string(), "WetRoad".to_string());

        Self {
            n: 3,
            m: 5,
            fields,
            normalization: NormalizationConfig {
                forced_no: FORCED_NO.iter().map(|c| c.to_string()).collect(),
                prerequisites,
            },
            smoothing: SmoothingConfig {
                fields: smoothed,
                overrides,
            },
            rule_set: RuleSet::new(default_checks()),
            ..Self::default()
        }
    }
}

fn default_checks() -> Vec<CheckGroup> {
    let mut checks = vec![
        CheckGroup::new(
            "TransversePlane",
            vec![RuleSpec::CrossFieldExclusivity {
                a: "Divided".to_string(),
                b: "Undivided".to_string(),
            }],
        ),
        CheckGroup::new(
            "NumberOfLanes",
            vec![RuleSpec::MagnitudeJump {
                field: "NumberOfLanes".to_string(),
                threshold: 2.0,
            }],
        ),
        CheckGroup::new(
            "RoadWorks",
            vec![
                RuleSpec::Implication {
                    cause: "RoadWorks".to_string(),
                    effects: vec![
                        "TemporaryRoadSignage".to_string(),
                        "TemporaryLineMarkers".to_string(),
                    ],
                    label: Some("signage/markers".to_string()),
                },
                RuleSpec::AdvisorySuspicion {
                    effect: "TemporaryLineMarkers".to_string(),
                    causes: vec!["RoadWorks".to_string(), "TemporaryRoadSignage".to_string()],
                },
            ],
        ),
        CheckGroup::new(
            "Illumination",
            vec![RuleSpec::IlluminationExclusivity {
                day: "Day".to_string(),
                night: "Night".to_string(),
            }],
        ),
        CheckGroup::new(
            "Cloudiness",
            vec![
                RuleSpec::OrderedTransition {
                    field: "Cloudiness".to_string(),
                },
                RuleSpec::OrdinalExclusivity {
                    field: "Cloudiness".to_string(),
                },
            ],
        ),
    ];

    for kind in SIGN_KINDS {
        checks.push(CheckGroup::new(
            *kind,
            vec![RuleSpec::ListLengthMismatch {
                a: kind.to_string(),
                b: format!("{kind}Times"),
            }],
        ));
    }

    checks
}
