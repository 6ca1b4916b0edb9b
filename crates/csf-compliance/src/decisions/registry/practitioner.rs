use crate::decisions::domain::{Jurisdiction, Severity};

use super::{Predicate, Rule};

/// Controlled Substance Form checks for individual prescribers.
pub(super) fn rules() -> Vec<Rule> {
    vec![
        Rule::builder(
            "csf_pract_dea_registration",
            "DEA registration on file",
            Severity::Block,
        )
        .jurisdiction(Jurisdiction::Federal)
        .citation("21 CFR 1301.11")
        .rationale("Every person who dispenses controlled substances must hold a DEA registration.")
        .requirement("Practitioner holds an active DEA registration.")
        .predicate(Predicate::is_true("dea_registration"))
        .narrative(
            "Valid DEA registration confirmed",
            "Proof of an active DEA registration",
            "Upload the practitioner's current DEA registration certificate (Form 223).",
        )
        .build(),
        Rule::builder(
            "csf_pract_dea_current",
            "DEA registration not expired",
            Severity::Block,
        )
        .jurisdiction(Jurisdiction::Federal)
        .citation("21 CFR 1301.13")
        .rationale("An expired registration carries no authority to handle controlled substances.")
        .requirement("DEA registration expiry date is in the future.")
        .predicate(Predicate::at_least("dea_expiry_days", 1.0))
        .narrative(
            "DEA registration is within its validity period",
            "A DEA registration expiry date in the future",
            "Renew the DEA registration and provide the updated expiration date.",
        )
        .build(),
        Rule::builder(
            "csf_pract_dea_expiry_buffer",
            "DEA registration expiry buffer",
            Severity::Review,
        )
        .jurisdiction(Jurisdiction::Federal)
        .citation("21 CFR 1301.13(e)")
        .rationale("Registrations expiring within 30 days risk lapsing before the next shipment.")
        .requirement("DEA registration remains valid for at least 30 more days.")
        .predicate(Predicate::at_least("dea_expiry_days", 30.0))
        .narrative(
            "DEA registration valid for at least 30 days",
            "Confirmation that the DEA registration will be renewed before it expires",
            "Submit the DEA renewal confirmation or schedule a renewal before approving shipments.",
        )
        .build(),
        Rule::builder(
            "csf_pract_state_license_active",
            "State medical license active",
            Severity::Block,
        )
        .jurisdiction(Jurisdiction::Global)
        .citation("21 CFR 1301.13(a)")
        .rationale("DEA authority depends on an active license in the state of practice.")
        .requirement("State license status is Active.")
        .predicate(Predicate::text_in("state_license_status", &["Active"]))
        .narrative(
            "Active state license verified",
            "Evidence of an active state professional license",
            "Provide a state board license verification showing Active status.",
        )
        .build(),
        Rule::builder(
            "csf_pract_state_license_expiry_buffer",
            "State license expiry buffer",
            Severity::Review,
        )
        .jurisdiction(Jurisdiction::Global)
        .citation("21 CFR 1301.13(a)")
        .rationale("A state license lapsing within 30 days needs renewal confirmation.")
        .requirement("State license remains valid for at least 30 more days.")
        .predicate(Predicate::at_least("state_license_expiry_days", 30.0))
        .narrative(
            "State license valid for at least 30 days",
            "A state license expiration date at least 30 days out",
            "Confirm the state license renewal with the licensing board.",
        )
        .build(),
        Rule::builder(
            "csf_pract_schedules_authorized",
            "Requested schedules authorized",
            Severity::Block,
        )
        .jurisdiction(Jurisdiction::Federal)
        .citation("21 CFR 1301.13(e)(1)")
        .rationale("Registrants may only handle the schedules listed on their registration.")
        .requirement("Every requested schedule is authorized on the DEA registration.")
        .predicate(Predicate::covers(
            "authorized_schedules",
            "requested_schedules",
        ))
        .narrative(
            "All requested schedules are authorized",
            "DEA authorization for every requested schedule",
            "Remove unauthorized schedules from the request or amend the DEA registration.",
        )
        .build(),
        Rule::builder(
            "csf_pract_telemedicine_attestation",
            "Ryan Haight telemedicine attestation",
            Severity::Review,
        )
        .jurisdiction(Jurisdiction::Federal)
        .citation("21 U.S.C. 829(e)")
        .rationale("Prescribing controlled substances via telemedicine requires documented compliance with the Ryan Haight Act.")
        .requirement("Telemedicine prescribers attest to Ryan Haight Act compliance.")
        .predicate(Predicate::when(
            Predicate::is_true("telemedicine_practice"),
            Predicate::is_true("has_ryan_haight_attestation"),
        ))
        .narrative(
            "Telemedicine obligations attested",
            "A Ryan Haight Act telemedicine attestation",
            "Collect a signed Ryan Haight Act attestation from the practitioner.",
        )
        .build(),
        Rule::builder(
            "csf_pract_schedule_ii_ordering",
            "Schedule II ordering channel",
            Severity::Info,
        )
        .jurisdiction(Jurisdiction::Federal)
        .citation("21 CFR 1305.03")
        .rationale("Schedule II orders must travel on DEA Form 222 or CSOS.")
        .requirement("Schedule II orders use DEA Form 222 or CSOS.")
        .predicate(Predicate::present("schedule_ii_order_channel"))
        .narrative(
            "Schedule II ordering channel noted",
            "",
            "",
        )
        .build(),
    ]
}
