//! Field schema for the nursery registration form.
//!
//! The schema is sent verbatim to the extraction service as a JSON-Schema
//! document and doubles as the key set of every flattened record.

use serde_json::{Map, Value};

use crate::core::types::FieldType;

pub const SCHEMA_TITLE: &str = "Nursery Registration Form Extraction Schema";
pub const SCHEMA_DIALECT: &str = "http://json-schema.org/draft-07/schema#";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
}

const fn text(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        field_type: FieldType::String,
    }
}

const fn flag(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        field_type: FieldType::Boolean,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSection {
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
}

pub const SECTIONS: &[FieldSection] = &[
    FieldSection {
        title: "Child Details",
        fields: &[
            text("childName"),
            text("age"),
            text("dateOfBirth"),
            text("countryOfBirth"),
            text("address"),
        ],
    },
    FieldSection {
        title: "Mother's Details",
        fields: &[
            text("motherName"),
            text("motherDob"),
            text("nationalInsurance"),
            text("email"),
            text("occupation"),
            text("homeNumberMother"),
            text("workNumberMother"),
            text("mobileMother"),
        ],
    },
    FieldSection {
        title: "Father's Details",
        fields: &[
            text("fatherName"),
            text("fatherDOB"),
            text("niFather"),
            text("emailFather"),
            text("occupationFather"),
            text("homeNumberFather"),
            text("workNumberFather"),
            text("mobileFather"),
        ],
    },
    FieldSection {
        title: "Additional Info",
        fields: &[
            text("nationality"),
            text("ethnicityCulturalBackground"),
            text("pickupAuthorization"),
        ],
    },
    FieldSection {
        title: "Other Children",
        fields: &[
            text("otherChild1Name"),
            text("otherChild1Age"),
            text("otherChild1Relationship"),
            text("otherChild2Name"),
            text("otherChild2Age"),
            text("otherChild2Relationship"),
        ],
    },
    FieldSection {
        title: "Family Info",
        fields: &[
            text("familyDoctor"),
            text("familyCircumstances"),
            text("childLivesWith"),
        ],
    },
    FieldSection {
        title: "Emergency Contacts",
        fields: &[
            text("emergencyContact1Name"),
            text("emergencyContact1Address"),
            text("emergencyContact1Phone"),
            text("emergencyContact1Relationship"),
            text("emergencyContact2Name"),
            text("emergencyContact2Address"),
            text("emergencyContact2Phone"),
            text("emergencyContact2Relationship"),
        ],
    },
    FieldSection {
        title: "Independence Skills",
        fields: &[
            flag("takeOffSocks"),
            flag("putOnSocks"),
            flag("takeOffShoes"),
            flag("putOnShoes"),
            flag("fastenVelcro"),
            flag("fastenBuckles"),
            flag("fastenLaces"),
            flag("takeOffCoat"),
            flag("hangUpCoat"),
            flag("putOnCoatZip"),
            flag("putOnCoatButtons"),
            flag("washHands"),
            flag("blowNose"),
            flag("eatBySelf"),
        ],
    },
    FieldSection {
        title: "Toileting",
        fields: &[
            flag("askToilet"),
            flag("useToiletProperly"),
            flag("goToiletAlone"),
            flag("needButtonHelp"),
            flag("needWashBottom"),
            flag("needWipeBottom"),
            flag("needWashHandsHelp"),
        ],
    },
    FieldSection {
        title: "Behavior & Moods",
        fields: &[
            text("specialToy"),
            text("dealWithFrustration"),
            text("comfortReassure"),
            text("worriesFrighten"),
            text("showPleased"),
            text("mixPlayChildren"),
            text("relationshipIssues"),
            text("additionalSettleInfo"),
        ],
    },
    FieldSection {
        title: "Playing & Learning",
        fields: &[
            text("gamesLikes"),
            text("familyFriendsPlay"),
            text("preferOthersAlone"),
            text("enjoyTogether"),
            text("techDevices"),
        ],
    },
    FieldSection {
        title: "Pre-school Experience",
        fields: &[
            text("childminder"),
            text("creche"),
            text("dayNursery"),
            text("nurserySchool"),
            text("parentToddler"),
            text("playGroup"),
            text("otherProvision"),
        ],
    },
    FieldSection {
        title: "Physical Health",
        fields: &[
            text("outdoorActivities"),
            flag("likesOutdoors"),
            flag("usedToWalking"),
            text("earlyDifficulties"),
            text("seriousIllnesses"),
            flag("hasVaccinations"),
            text("developmentReview"),
            text("allergiesDietary"),
            flag("isRightHanded"),
            text("bedtime"),
            flag("hasWakingProblems"),
            flag("sleepsAfternoon"),
            text("externalServices"),
        ],
    },
    FieldSection {
        title: "Talking & Listening",
        fields: &[
            text("languagesSpoken"),
            flag("speechClear"),
            flag("listensAttentively"),
            flag("carriesInstructions"),
            text("favoriteBook"),
            text("nurseryRhymes"),
            flag("likesBooks"),
            text("libraryVisits"),
        ],
    },
    FieldSection {
        title: "Consents",
        fields: &[
            flag("consentDataProcessing"),
            flag("consentLocalTrips"),
            flag("consentPhotographs"),
            flag("consentEmergencyContact"),
            flag("consentArtworkDisplay"),
            flag("consentLearningJourney"),
            flag("agreeNurseryPolicies"),
            flag("agreePayFees"),
        ],
    },
    FieldSection {
        title: "Nursery Details",
        fields: &[
            text("grade"),
            text("nursery"),
            text("yearJoined"),
            text("nurseryName"),
            text("yearType"),
        ],
    },
];

/// All fields in declaration order.
pub fn fields() -> impl Iterator<Item = &'static FieldSpec> {
    SECTIONS.iter().flat_map(|section| section.fields.iter())
}

pub fn field_names() -> impl Iterator<Item = &'static str> {
    fields().map(|field| field.name)
}

pub fn field_count() -> usize {
    SECTIONS.iter().map(|section| section.fields.len()).sum()
}

pub fn field_type(name: &str) -> Option<FieldType> {
    fields()
        .find(|field| field.name == name)
        .map(|field| field.field_type)
}

/// Renders the JSON-Schema document expected by the extraction service.
pub fn json_schema() -> Value {
    let properties: Map<String, Value> = fields()
        .map(|field| {
            (
                field.name.to_string(),
                serde_json::json!({ "type": field.field_type.as_str() }),
            )
        })
        .collect();

    serde_json::json!({
        "type": "object",
        "title": SCHEMA_TITLE,
        "$schema": SCHEMA_DIALECT,
        "properties": properties,
    })
}

/// The schema as the string value of the `fields_schema` multipart part.
pub fn json_schema_string() -> String {
    json_schema().to_string()
}
