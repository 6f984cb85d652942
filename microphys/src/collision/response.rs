// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Contact response shared by both relaxation branches
//!
//! # Separation
//!
//! Only rigid bodies are moved. Two rigid bodies split the correction evenly;
//! a rigid body against anything else (static, kinematic or plain) takes the
//! whole correction.
//!
//! # Velocity
//!
//! A rigid body moving into the surface (`v·n < 0`) either bounces
//! (`reflect(n) * restitution`) or loses its normal component (`slide(n)`).
//! Bodies already separating are left alone, so later relaxation passes over
//! the same pair cannot flip a bounce back.

use super::narrow::Contact;
use crate::body::{Actor, PhysicsBody};
use crate::math::{Real, Scalar, Vector2};

/// Push `a` and `b` apart along `contact` and fix up their velocities
pub fn apply_response(a: &mut Actor, b: &mut Actor, contact: &Contact) {
    let n = contact.normal;
    let a_moves = a.is_rigid();
    let b_moves = b.is_rigid();

    match (a_moves, b_moves) {
        (true, true) => {
            let half = contact.penetration / Scalar::from_i32(2);
            a.position += n * half;
            b.position -= n * half;
        }
        (true, false) => a.position += n * contact.penetration,
        (false, true) => b.position -= n * contact.penetration,
        (false, false) => return,
    }

    if a_moves {
        if let Some(body) = a.body.as_mut() {
            respond_velocity(body, n);
        }
    }
    if b_moves {
        if let Some(body) = b.body.as_mut() {
            respond_velocity(body, -n);
        }
    }
}

/// `n` points away from the surface the body is touching
fn respond_velocity(body: &mut PhysicsBody, n: Vector2) {
    if body.velocity.dot(n) >= Scalar::ZERO {
        return;
    }
    body.velocity = if body.bounce {
        body.velocity.reflect(n) * body.restitution
    } else {
        body.velocity.slide(n)
    };
}
