// Copyright @yucwang 2026

use crate::core::diffuser::Face;
use crate::core::error::{RadiosityError, RadiosityResult};
use crate::core::rng::Sampler;
use crate::core::scene::Scene;
use crate::core::settings::SimulationSettings;
use crate::emitters::directional::DirectionalLight;
use crate::integrators::transport::{TransportEstimate, TransportEstimator, TransportMatrix};
use crate::math::constants::{Float, MatrixXf, VectorXf};
use crate::solvers::{cgs, lsqr, pccg, AdjointOperator, FnOperator, LinearOperator, Solution, SolverKind};

/// `A = I - D T` where `T` carries outgoing flux to the faces it lands on and
/// `D` turns incident flux into outgoing flux: a face keeps `rho` of what it
/// receives and passes `tau` of it to the opposite face of a translucent
/// diffuser.
pub struct RadiosityOperator<'a> {
    transport: &'a TransportMatrix,
    scattering: TransportMatrix,
}

impl<'a> RadiosityOperator<'a> {
    pub fn new(scene: &Scene, transport: &'a TransportMatrix) -> RadiosityResult<Self> {
        let n = scene.face_count();
        if transport.nrows() != n || transport.ncols() != n {
            return Err(RadiosityError::invalid_argument(
                "RadiosityOperator::new",
                format!("transport is {}x{} for {} faces", transport.nrows(), transport.ncols(), n)));
        }

        let mut scattering = TransportMatrix::new(n, n);
        for diffuser in scene.diffusers().iter().filter(|d| d.is_real()) {
            for &face in diffuser.faces() {
                let k = diffuser.id_of(face) as usize;
                scattering.push(k, k, diffuser.rho_of(face))?;
                if let Some(opposite) = diffuser.opposite_id(face) {
                    scattering.push(k, opposite as usize, diffuser.tau_of(face.opposite()))?;
                }
            }
        }

        Ok(Self { transport, scattering })
    }

    pub fn scattering(&self) -> &TransportMatrix {
        &self.scattering
    }

    /// First-order outgoing flux, `D * primary`.
    pub fn rhs(&self, primary: &VectorXf) -> VectorXf {
        self.scattering.apply(primary)
    }

    pub fn to_dense(&self) -> MatrixXf {
        let n = self.nrows();
        let mut m = MatrixXf::zeros(n, n);
        for j in 0..n {
            let mut e = VectorXf::zeros(n);
            e[j] = 1.0;
            m.set_column(j, &self.apply(&e));
        }
        m
    }
}

impl<'a> LinearOperator for RadiosityOperator<'a> {
    fn nrows(&self) -> usize {
        self.scattering.nrows()
    }

    fn ncols(&self) -> usize {
        self.scattering.ncols()
    }

    fn apply(&self, x: &VectorXf) -> VectorXf {
        x - self.scattering.apply(&self.transport.apply(x))
    }
}

impl<'a> AdjointOperator for RadiosityOperator<'a> {
    fn apply_transpose(&self, x: &VectorXf) -> VectorXf {
        x - self.transport.apply_transpose(&self.scattering.apply_transpose(x))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaceReport {
    pub diffuser: usize,
    pub name: u64,
    pub face: Face,
    pub id: u32,
    pub area: Float,
    pub incident_flux: Float,
    pub incident_irradiance: Float,
    /// Outgoing flux per unit area.
    pub radiosity: Float,
    pub absorbed: Float,
}

/// Irradiance seen by a sensor, counting flux from both half-spaces.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReport {
    pub diffuser: usize,
    pub name: u64,
    pub id: u32,
    pub irradiance: Float,
}

#[derive(Debug, Clone)]
pub struct RadiosityReport {
    pub outgoing: VectorXf,
    pub incident: VectorXf,
    pub faces: Vec<FaceReport>,
    pub sensors: Vec<SensorReport>,
    pub iterations: usize,
    pub converged: bool,
}

impl RadiosityReport {
    pub fn total_absorbed(&self) -> Float {
        self.faces.iter().map(|f| f.absorbed).sum()
    }
}

pub struct RadiosityIntegrator {
    settings: SimulationSettings,
}

impl RadiosityIntegrator {
    pub fn new(settings: SimulationSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Partitions the scene, gathers first-order flux from `lights`,
    /// estimates transport and solves the energy balance. With
    /// `direct_only` set the run ends after the first-order flux.
    pub fn run(&self, scene: &mut Scene, lights: &[DirectionalLight]) -> RadiosityResult<RadiosityReport> {
        if scene.is_empty() {
            return Err(RadiosityError::invalid_argument("RadiosityIntegrator::run", "scene has no diffusers"));
        }
        scene.build_bsp(self.settings.bsp);
        let scene: &Scene = scene;

        let mut sampler = Sampler::new(self.settings.seed);
        let mut primary = VectorXf::zeros(scene.face_count());
        for light in lights {
            primary += light.primary_flux(scene, self.settings.direct_samples, &mut sampler)?;
        }
        log::info!("Primary flux: {:.6} over {} faces.", primary.sum(), scene.face_count());

        if self.settings.direct_only {
            return self.project(scene, &primary);
        }
        let estimator = TransportEstimator::new(self.settings.samples_per_face, self.settings.show_progress);
        let estimate = estimator.estimate(scene, &mut sampler)?;
        self.solve(scene, &estimate, &primary)
    }

    /// Solves the energy balance for a transport estimate and first-order
    /// flux computed beforehand.
    ///
    /// Neither input depends on the optical properties, so one estimate can
    /// be reused across wavebands: rebuild the scene with the same geometry
    /// and the optics of another band, then solve again.
    pub fn solve(&self, scene: &Scene, estimate: &TransportEstimate, primary: &VectorXf)
        -> RadiosityResult<RadiosityReport> {
        check_primary("RadiosityIntegrator::solve", scene, primary)?;

        let op = RadiosityOperator::new(scene, &estimate.faces)?;
        let b = op.rhs(primary);
        let solution = self.solve_system(&op, &b)?;
        log::info!("{} finished after {} iterations (converged: {}).",
                   self.settings.solver, solution.iterations, solution.converged);

        let incident = primary + estimate.faces.apply(&solution.x);
        let seen_by_sensors = primary + estimate.sensors.apply(&solution.x);
        Ok(build_report(scene, solution.x, incident, &seen_by_sensors, solution.iterations, solution.converged))
    }

    /// First-order result: every face scatters what the lights deliver and
    /// nothing travels between faces.
    pub fn project(&self, scene: &Scene, primary: &VectorXf) -> RadiosityResult<RadiosityReport> {
        check_primary("RadiosityIntegrator::project", scene, primary)?;

        let n = scene.face_count();
        let no_transport = TransportMatrix::new(n, n);
        let outgoing = RadiosityOperator::new(scene, &no_transport)?.rhs(primary);
        Ok(build_report(scene, outgoing, primary.clone(), primary, 0, true))
    }

    fn solve_system(&self, op: &RadiosityOperator<'_>, b: &VectorXf) -> RadiosityResult<Solution> {
        let control = self.settings.iteration_control();
        let tol = self.settings.tolerance;
        match self.settings.solver {
            SolverKind::Cgs => {
                // A is close to the identity, so b is a good first guess.
                let x0 = b.clone();
                let r0 = b - op.apply(&x0);
                cgs(&control, op, b, &r0, tol, x0)
            }
            SolverKind::Lsqr => lsqr(&control, op, b, tol),
            SolverKind::Pccg => {
                // A is not symmetric; work on the normal equations.
                let n = op.nrows();
                let normal = FnOperator::new(n, n, |x: &VectorXf| op.apply_transpose(&op.apply(x)));
                pccg(&control, &normal, None, &op.apply_transpose(b), tol, None)
            }
        }
    }
}

fn check_primary(context: &'static str, scene: &Scene, primary: &VectorXf) -> RadiosityResult<()> {
    let n = scene.face_count();
    if primary.len() != n {
        return Err(RadiosityError::invalid_argument(
            context, format!("{} primary values for {} faces", primary.len(), n)));
    }
    Ok(())
}

fn build_report(scene: &Scene, outgoing: VectorXf, incident: VectorXf, seen_by_sensors: &VectorXf,
                iterations: usize, converged: bool) -> RadiosityReport {
    let mut faces = Vec::new();
    let mut sensors = Vec::new();
    for (idx, diffuser) in scene.diffusers().iter().enumerate() {
        let area = diffuser.surface();
        if !diffuser.is_real() {
            let id = diffuser.id();
            sensors.push(SensorReport {
                diffuser: idx,
                name: diffuser.name(),
                id,
                irradiance: seen_by_sensors[id as usize] / area,
            });
            continue;
        }
        for &face in diffuser.faces() {
            let id = diffuser.id_of(face);
            let incident_flux = incident[id as usize];
            faces.push(FaceReport {
                diffuser: idx,
                name: diffuser.name(),
                face,
                id,
                area,
                incident_flux,
                incident_irradiance: incident_flux / area,
                radiosity: outgoing[id as usize] / area,
                absorbed: incident_flux * (1.0 - diffuser.rho_of(face) - diffuser.tau_of(face)),
            });
        }
    }

    RadiosityReport { outgoing, incident, faces, sensors, iterations, converged }
}
