/*! Cable integrator.

Advances the membrane voltages of a cable by one fixed time step. For node `i`
with neighbors `j`:

`C[i] dv[i]/dt = -A[i] I_ion(v[i]) + sum_j G (v[j] - v[i]) + sum_j G (ve[j] - ve[i])`

where `v` is the membrane potential, `ve` is the extracellular potential,
`C` is the node capacitance, `A` the membrane area and `G` the axial
conductance between node centers. The last sum is the drive from the applied
field.

The ionic current is linearized around the present voltage, which makes each
implicit step a tridiagonal linear system. After the voltages are updated every
mechanism advances its gates at the new voltage. */

use crate::cable::Cable;
use crate::membrane::Mechanism;
use crate::IntegrationMethod;

/// Converts mA (from current densities times cm^2) to uA.
const MA_TO_UA: f64 = 1e3;

pub struct Integrator {
    method: IntegrationMethod,
    rhs: Vec<f64>,
    diag: Vec<f64>,
    scratch: Vec<f64>,
}

impl Integrator {
    pub fn new(method: IntegrationMethod) -> Integrator {
        Integrator {
            method,
            rhs: vec![],
            diag: vec![],
            scratch: vec![],
        }
    }

    pub fn method(&self) -> IntegrationMethod {
        self.method
    }

    /** Run the cable forward by `dt`.

    Uses the extracellular potentials currently stored in the cable's nodes.
    This does not check for numeric blowups, the caller must inspect the
    resulting voltages. */
    pub fn advance(&mut self, cable: &mut Cable, mechanisms: &mut [Box<dyn Mechanism>], dt: f64) {
        debug_assert_eq!(cable.len(), mechanisms.len());
        let len = cable.len();
        let g_axial = cable.axial_conductance();
        // Implicit methods solve over this much time.
        let h = match self.method {
            IntegrationMethod::ForwardEuler | IntegrationMethod::BackwardEuler => dt,
            IntegrationMethod::CrankNicholson => dt / 2.0,
        };
        self.rhs.clear();
        self.diag.clear();
        {
            let nodes = cable.nodes();
            for (i, node) in nodes.iter().enumerate() {
                let area = node.area() * MA_TO_UA;
                let mechanism = &mechanisms[i];
                let mut rhs = -mechanism.current(node.voltage) * area;
                let mut diag = node.total_capacitance() / h + mechanism.conductance(node.voltage) * area;
                for j in cable.neighbors(i) {
                    let neighbor = &nodes[j];
                    rhs += g_axial
                        * ((neighbor.voltage - node.voltage)
                            + (neighbor.extracellular - node.extracellular));
                    diag += g_axial;
                }
                self.rhs.push(rhs);
                self.diag.push(diag);
            }
        }
        match self.method {
            IntegrationMethod::ForwardEuler => {
                for (dv, node) in self.rhs.iter_mut().zip(cable.nodes()) {
                    *dv *= dt / node.total_capacitance();
                }
            }
            IntegrationMethod::BackwardEuler => {
                solve_tridiagonal(-g_axial, &self.diag, &mut self.rhs, &mut self.scratch);
            }
            IntegrationMethod::CrankNicholson => {
                // Solve for the midpoint, then extrapolate to the full step.
                solve_tridiagonal(-g_axial, &self.diag, &mut self.rhs, &mut self.scratch);
                self.rhs.iter_mut().for_each(|dv| *dv *= 2.0);
            }
        }
        debug_assert_eq!(self.rhs.len(), len);
        for ((node, mechanism), dv) in cable
            .nodes_mut()
            .iter_mut()
            .zip(mechanisms.iter_mut())
            .zip(&self.rhs)
        {
            node.voltage += dv;
            mechanism.advance(node.voltage, dt);
        }
    }
}

/** Solve a symmetric tridiagonal system with a constant off-diagonal.

Thomas algorithm. On entry `x` holds the right hand side, on exit it holds the
solution. The cable matrix is diagonally dominant so no pivoting is needed. */
fn solve_tridiagonal(off_diag: f64, diag: &[f64], x: &mut [f64], scratch: &mut Vec<f64>) {
    let n = diag.len();
    debug_assert_eq!(x.len(), n);
    if n == 0 {
        return;
    }
    scratch.clear();
    scratch.resize(n, 0.0);
    // Forward sweep.
    scratch[0] = off_diag / diag[0];
    x[0] /= diag[0];
    for i in 1..n {
        let denominator = diag[i] - off_diag * scratch[i - 1];
        scratch[i] = off_diag / denominator;
        x[i] = (x[i] - off_diag * x[i - 1]) / denominator;
    }
    // Back substitution.
    for i in (0..n - 1).rev() {
        x[i] -= scratch[i] * x[i + 1];
    }
}
