use crate::decisions::domain::{Jurisdiction, Severity};

use super::{Predicate, Rule};

/// Controlled Substance Form checks for hospitals, clinics and other facilities.
pub(super) fn rules() -> Vec<Rule> {
    vec![
        Rule::builder(
            "csf_fac_dea_registration",
            "Facility DEA registration",
            Severity::Block,
        )
        .jurisdiction(Jurisdiction::Federal)
        .citation("21 CFR 1301.11")
        .rationale("Facilities receiving controlled substances must be registered with the DEA.")
        .requirement("Facility holds an active DEA registration.")
        .predicate(Predicate::all(vec![
            Predicate::is_true("dea_registration"),
            Predicate::at_least("dea_expiry_days", 1.0),
        ]))
        .narrative(
            "Facility DEA registration active",
            "Proof of an active facility DEA registration",
            "Upload the facility's DEA registration certificate with a current expiration date.",
        )
        .build(),
        Rule::builder(
            "csf_fac_state_license_active",
            "State facility license active",
            Severity::Block,
        )
        .jurisdiction(Jurisdiction::Global)
        .citation("21 CFR 1301.13(a)")
        .rationale("DEA authority for a facility follows its state licensure.")
        .requirement("State facility or pharmacy license status is Active.")
        .predicate(Predicate::text_in(
            "state_license_status",
            &["Active", "Active - Renewal Pending"],
        ))
        .narrative(
            "Active state facility license verified",
            "Evidence of an active state facility license",
            "Provide the state facility license verification.",
        )
        .build(),
        Rule::builder(
            "csf_fac_schedules_authorized",
            "Facility schedules authorized",
            Severity::Block,
        )
        .jurisdiction(Jurisdiction::Federal)
        .citation("21 CFR 1301.13(e)(1)")
        .rationale("Facilities may only receive schedules covered by their registration.")
        .requirement("Every requested schedule is authorized on the facility registration.")
        .predicate(Predicate::covers(
            "authorized_schedules",
            "requested_schedules",
        ))
        .narrative(
            "All requested schedules are authorized for the facility",
            "Facility DEA authorization for every requested schedule",
            "Limit the request to authorized schedules or amend the facility registration.",
        )
        .build(),
        Rule::builder(
            "csf_fac_responsible_person",
            "Responsible person designated",
            Severity::Review,
        )
        .jurisdiction(Jurisdiction::Federal)
        .citation("21 CFR 1301.76")
        .rationale("A named individual must answer for controlled-substance handling at the facility.")
        .requirement("Facility names a responsible person with a valid license number.")
        .predicate(Predicate::all(vec![
            Predicate::present("responsible_person_name"),
            Predicate::present("responsible_person_license"),
        ]))
        .narrative(
            "Responsible person designated",
            "Name and license number of the responsible person",
            "Identify the facility's responsible person and record their license number.",
        )
        .build(),
        Rule::builder(
            "csf_fac_storage_security",
            "Secure storage attested",
            Severity::Review,
        )
        .jurisdiction(Jurisdiction::Federal)
        .citation("21 CFR 1301.75")
        .rationale("Controlled substances must be stored in a securely locked, substantially constructed cabinet.")
        .requirement("Facility attests to compliant controlled-substance storage.")
        .predicate(Predicate::is_true("storage_security_attested"))
        .narrative(
            "Secure storage attested",
            "A storage security attestation",
            "Obtain a signed storage security attestation from the facility.",
        )
        .build(),
        Rule::builder(
            "csf_fac_ship_to_match",
            "Ship-to address matches registration",
            Severity::Info,
        )
        .jurisdiction(Jurisdiction::Federal)
        .citation("21 CFR 1301.12")
        .rationale("Each principal place of business needs its own registration.")
        .requirement("Deliveries go to the registered address.")
        .predicate(Predicate::is_true("ship_to_matches_registration"))
        .narrative("Ship-to address matches the registration", "", "")
        .build(),
    ]
}
