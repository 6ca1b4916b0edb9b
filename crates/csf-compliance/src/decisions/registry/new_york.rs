use crate::decisions::domain::{Jurisdiction, Severity};

use super::{Predicate, Rule};

/// New York pharmacy registration checks.
pub(super) fn rules() -> Vec<Rule> {
    let new_york = Jurisdiction::state("NY");

    vec![
        Rule::builder(
            "ny_pharm_registration_active",
            "Pharmacy registration active",
            Severity::Block,
        )
        .jurisdiction(new_york.clone())
        .citation("NY Educ. Law 6808")
        .rationale("A pharmacy may not operate in New York without a current Board of Pharmacy registration.")
        .requirement("New York pharmacy registration is Active.")
        .predicate(Predicate::all(vec![
            Predicate::present("ny_registration_number"),
            Predicate::text_in("ny_registration_status", &["Active", "Registered"]),
        ]))
        .narrative(
            "New York pharmacy registration active",
            "An active New York pharmacy registration",
            "Provide the NYSED Office of the Professions registration verification.",
        )
        .build(),
        Rule::builder(
            "ny_pharm_supervising_pharmacist",
            "Supervising pharmacist verified",
            Severity::Block,
        )
        .jurisdiction(new_york.clone())
        .citation("NY Educ. Law 6808(2)(c)")
        .rationale("Each registered pharmacy must operate under a licensed supervising pharmacist.")
        .requirement("The supervising pharmacist's New York license has been verified.")
        .predicate(Predicate::is_true("supervising_pharmacist_verified"))
        .narrative(
            "Supervising pharmacist license verified",
            "Verification of the supervising pharmacist's license",
            "Verify the supervising pharmacist's license with NYSED.",
        )
        .build(),
        Rule::builder(
            "ny_pharm_bne_license",
            "BNE controlled substance license",
            Severity::Review,
        )
        .jurisdiction(new_york.clone())
        .citation("NY Pub. Health Law 3302")
        .rationale("Dispensing controlled substances in New York also needs Bureau of Narcotic Enforcement licensing.")
        .requirement("Pharmacies dispensing controlled substances hold a current BNE license.")
        .predicate(Predicate::when(
            Predicate::is_true("dispenses_controlled_substances"),
            Predicate::is_true("bne_license_current"),
        ))
        .narrative(
            "BNE licensing confirmed",
            "A current Bureau of Narcotic Enforcement license",
            "Request the pharmacy's current BNE license from the Department of Health.",
        )
        .build(),
        Rule::builder(
            "ny_pharm_expiry_buffer",
            "Registration renewal window",
            Severity::Review,
        )
        .jurisdiction(new_york.clone())
        .citation("8 NYCRR 63.6")
        .rationale("Registrations within 30 days of expiry need renewal confirmation.")
        .requirement("Pharmacy registration remains valid for at least 30 more days.")
        .predicate(Predicate::at_least("ny_registration_expiry_days", 30.0))
        .narrative(
            "Registration valid for at least 30 days",
            "A registration expiry date at least 30 days out",
            "Confirm the pharmacy registration renewal with NYSED.",
        )
        .build(),
        Rule::builder(
            "ny_pharm_triennial_renewal",
            "Triennial renewal cycle",
            Severity::Info,
        )
        .jurisdiction(new_york)
        .citation("NY Educ. Law 6808(4)")
        .rationale("New York pharmacy registrations renew every three years.")
        .requirement("Registration renewal cycle is tracked.")
        .predicate(Predicate::present("ny_registration_expiry_days"))
        .narrative("Renewal cycle tracked", "", "")
        .build(),
    ]
}
