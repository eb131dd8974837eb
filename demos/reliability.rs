//! Example: Reliability analysis of a multi-state system
//!
//! The structure function of a nonhomogeneous system with four components
//! is given by its truth vector. The example computes availability,
//! minimal cut vectors and the structural importance of a component.

use mdd_logic::{dpld, DiagramManager, VarChange};

fn main() {
    env_logger::init();

    // Truth vector of the structure function.
    let vector = vec![
        0, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 1, 2, 2, 2,
        2, 2, 1, 2, 2, 2, 2, 2,
    ];

    // Components have 2, 3, 2 and 3 states.
    let m = DiagramManager::mixed(4, 1_000, vec![2, 3, 2, 3]);
    let sf = m.from_vector(&vector);

    // Component state probabilities: ps[i][k] = P(component i in state k).
    let ps = vec![
        vec![0.1, 0.9, 0.0],
        vec![0.2, 0.6, 0.2],
        vec![0.3, 0.7, 0.0],
        vec![0.1, 0.6, 0.3],
    ];

    let availability = m.calculate_availability(1, &ps, &sf);
    let unavailability = m.calculate_unavailability(1, &ps, &sf);
    println!("A(1) = {availability}");
    println!("U(1) = {unavailability}");

    println!("state probabilities = {:?}", m.calculate_probabilities(&ps, &sf));

    let cuts = m.mcvs(&sf, 1);
    println!("minimal cut vectors for state 1:");
    for cut in &cuts {
        println!("  {cut:?}");
    }

    // Structural importance of the third component via a derivative.
    let change = VarChange {
        index: 2,
        from: 1,
        to: 0,
    };
    let derivative = m.dpld(change, dpld::type_3_decrease(1), &sf);
    println!("SI_2 = {}", m.structural_importance(&derivative));
}
