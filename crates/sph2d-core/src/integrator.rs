//! Semi-implicit Euler integration and wall reflection

use crate::domain::Domain;
use crate::particle::Particle;

/// Advance every particle by its own timestep, then keep it inside the
/// domain. Must run after the force pass has finished for all particles.
///
/// Returns the number of wall contacts this step.
pub fn integrate(particles: &mut [Particle], domain: &Domain) -> usize {
    let mut contacts = 0;

    for p in particles.iter_mut() {
        let dt = p.timestep();
        let mass = p.mass();

        p.velocity += dt * p.force / mass;
        p.position += dt * p.velocity;

        contacts += enforce_boundary(p, domain);
    }

    contacts
}

/// Clamp a particle into the domain, reflecting outward velocity.
///
/// Returns how many axes were clamped.
pub fn enforce_boundary(p: &mut Particle, domain: &Domain) -> usize {
    let (min, max) = (domain.min(), domain.max());
    let damping = domain.damping;

    let hit_x = reflect_axis(&mut p.position.x, &mut p.velocity.x, min.x, max.x, damping);
    let hit_y = reflect_axis(&mut p.position.y, &mut p.velocity.y, min.y, max.y, damping);

    hit_x as usize + hit_y as usize
}

fn reflect_axis(x: &mut f32, v: &mut f32, lo: f32, hi: f32, damping: f32) -> bool {
    if *x < lo {
        *x = lo;
        if *v < 0.0 {
            *v = -*v * damping;
        }
        true
    } else if *x > hi {
        *x = hi;
        if *v > 0.0 {
            *v = -*v * damping;
        }
        true
    } else {
        false
    }
}
