//! The actuator interface the arbiters drive.

/// Low-level motor interface for a robot platform.
///
/// Each arbiter calls exactly one of these per tally cycle when it has
/// a winning vote. Implementations are platform glue (serial links,
/// simulators, test recorders) and are free to interpret the commands
/// as their hardware requires.
pub trait Robot: Send {
    /// Drive at the given speed (m/s). `pwm` is the open-loop motor
    /// duty to use on platforms without an RPM sensor.
    fn drive(&mut self, speed: f32, pwm: i32);

    /// Steer while moving, car-like, toward the given direction
    /// (degrees; positive is left).
    fn turn(&mut self, direction: f32);

    /// Turn in place by the given angle (degrees; positive is
    /// counterclockwise).
    fn spin(&mut self, angle: f32);

    /// Stop all motors. Called once at controller teardown.
    fn off(&mut self);
}
