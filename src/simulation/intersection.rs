//! Traffic lights and their waiting queues
//!
//! Every light is a two-state timer: it flips between green and red each time
//! a full cycle of simulated time has accumulated. Vehicles that reach a red
//! light's stop line join its queue, and a green light lets them go one at a
//! time, one per release interval.

use log::debug;
use std::collections::{BTreeMap, VecDeque};

use super::types::{VehicleId, LIGHT_CYCLE_DURATION, LIGHT_SPACING, RELEASE_INTERVAL};
use crate::map::NodeId;

/// A traffic light at an intersection
#[derive(Debug, Clone, PartialEq)]
pub struct SimTrafficLight {
    pub node_id: NodeId,
    pub is_green: bool,
    /// Time spent in the current color
    pub timer: f64,
    pub cycle_duration: f64,
}

impl SimTrafficLight {
    pub fn new(node_id: NodeId, is_green: bool) -> Self {
        Self {
            node_id,
            is_green,
            timer: 0.0,
            cycle_duration: LIGHT_CYCLE_DURATION,
        }
    }

    /// Advance the light timer
    /// Returns true if the light changed color
    pub fn update(&mut self, delta_secs: f64) -> bool {
        self.timer += delta_secs;
        if self.timer >= self.cycle_duration {
            self.is_green = !self.is_green;
            self.timer = 0.0;
            return true;
        }
        false
    }
}

/// Vehicles waiting at one light, in arrival order
#[derive(Debug, Clone, Default)]
pub struct IntersectionQueue {
    waiting: VecDeque<VehicleId>,
    /// Green time accumulated since the last release
    release_timer: f64,
}

impl IntersectionQueue {
    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    pub fn contains(&self, vehicle_id: VehicleId) -> bool {
        self.waiting.contains(&vehicle_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VehicleId> {
        self.waiting.iter()
    }

    /// Accumulate green time and release the front vehicle once enough has passed
    fn release(&mut self, delta_secs: f64) -> Option<VehicleId> {
        if self.waiting.is_empty() {
            return None;
        }

        self.release_timer += delta_secs;
        if self.release_timer < RELEASE_INTERVAL {
            return None;
        }

        self.release_timer = 0.0;
        self.waiting.pop_front()
    }
}

/// All traffic lights and queues, keyed by intersection node
#[derive(Debug, Clone, Default)]
pub struct IntersectionControl {
    lights: BTreeMap<NodeId, SimTrafficLight>,
    queues: BTreeMap<NodeId, IntersectionQueue>,
}

impl IntersectionControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Place lights on every `LIGHT_SPACING`th node of `node_ids`
    ///
    /// `node_ids` must be in ascending order. Initial colors alternate,
    /// starting with green.
    pub fn place_lights(&mut self, node_ids: impl IntoIterator<Item = NodeId>) {
        for (count, node_id) in node_ids.into_iter().enumerate() {
            if count % LIGHT_SPACING != 0 {
                continue;
            }
            let is_green = count % (2 * LIGHT_SPACING) == 0;
            self.lights
                .insert(node_id, SimTrafficLight::new(node_id, is_green));
            self.queues.insert(node_id, IntersectionQueue::default());
        }
        debug!("Placed {} traffic lights", self.lights.len());
    }

    /// Remove all lights and queues
    pub fn clear(&mut self) {
        self.lights.clear();
        self.queues.clear();
    }

    pub fn light(&self, node_id: NodeId) -> Option<&SimTrafficLight> {
        self.lights.get(&node_id)
    }

    /// Force a light's color and restart its cycle
    /// Returns false if there is no light at the node
    pub fn set_light(&mut self, node_id: NodeId, is_green: bool) -> bool {
        match self.lights.get_mut(&node_id) {
            Some(light) => {
                light.is_green = is_green;
                light.timer = 0.0;
                true
            }
            None => false,
        }
    }

    /// `true` if a light exists at the node and it is red
    pub fn is_red(&self, node_id: NodeId) -> bool {
        self.lights.get(&node_id).is_some_and(|light| !light.is_green)
    }

    /// Lights in ascending node order
    pub fn lights(&self) -> impl Iterator<Item = &SimTrafficLight> {
        self.lights.values()
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    pub fn queue(&self, node_id: NodeId) -> Option<&IntersectionQueue> {
        self.queues.get(&node_id)
    }

    pub fn queue_len(&self, node_id: NodeId) -> usize {
        self.queues.get(&node_id).map_or(0, IntersectionQueue::len)
    }

    /// Advance every light's cycle timer
    pub fn update_lights(&mut self, delta_secs: f64) {
        for light in self.lights.values_mut() {
            if light.update(delta_secs) && light.is_green {
                debug!(
                    "Light GREEN at node {} - vehicles will start releasing",
                    light.node_id
                );
            }
        }
    }

    /// Add a vehicle to the queue at `node_id` unless it is already waiting there
    /// Returns true if the vehicle was added
    pub fn enqueue(&mut self, node_id: NodeId, vehicle_id: VehicleId) -> bool {
        let Some(queue) = self.queues.get_mut(&node_id) else {
            return false;
        };
        if queue.contains(vehicle_id) {
            return false;
        }

        queue.waiting.push_back(vehicle_id);
        debug!(
            "Vehicle {} queued at red light {}, queue size: {}",
            vehicle_id.0,
            node_id,
            queue.len()
        );
        true
    }

    /// Release at most one vehicle from each green light's queue
    /// Returns the released vehicles
    pub fn drain_queues(&mut self, delta_secs: f64) -> Vec<VehicleId> {
        let mut released = Vec::new();

        for (node_id, light) in &self.lights {
            if !light.is_green {
                continue;
            }
            let Some(queue) = self.queues.get_mut(node_id) else {
                continue;
            };

            if let Some(vehicle_id) = queue.release(delta_secs) {
                debug!(
                    "Vehicle {} released from queue at light {}, remaining queue size: {}",
                    vehicle_id.0,
                    node_id,
                    queue.len()
                );
                released.push(vehicle_id);
            }
        }

        released
    }
}
