/////////////////////////////////////////////////////////////////////////////////////////////////
// TESTS
/////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use crate::IVtools::iv_types::DatasheetSpecs;
    use crate::IVtools::ivtools_errors::ExtractionError;
    use crate::IVtools::sdm_desoto::*;
    use crate::IVtools::single_diode::i_from_v;
    use crate::IVtools::temperature_model::bandgap_for;
    use crate::Numerics::{LMSettings, LMStatus, LevenbergMarquardt, NalgebraBackend};
    use approx::assert_relative_eq;
    use nalgebra::DVector;

    fn silicon_module() -> DatasheetSpecs {
        DatasheetSpecs {
            v_mp: 31.0,
            i_mp: 7.61,
            v_oc: 37.9,
            i_sc: 8.09,
            alpha_sc: 0.004,
            beta_voc: -0.127,
            cells_in_series: 60,
        }
    }

    #[test]
    fn test_fit_sdm_desoto_silicon_module() {
        let specs = silicon_module();
        let sdm = fit_sdm_desoto("monoSi", &specs, 25.0, 1000.0).unwrap();
        assert_relative_eq!(sdm.I_L_ref, 8.09, max_relative = 1e-2);
        assert!(sdm.a_ref > 0.0);
        assert!(sdm.R_sh_ref > 0.0);
        assert!(sdm.I_o_ref > 0.0);
        assert_relative_eq!(sdm.alpha_sc, 0.004 * 8.09 / 100.0, epsilon = 1e-15);
        assert_eq!(sdm.EgRef, 1.796e-19);
        assert_eq!(sdm.dEgdT, -0.0002677);
        assert_eq!(sdm.irrad_ref, 1000.0);
        assert_eq!(sdm.temp_ref, 25.0);

        // the solution satisfies the five equations
        let system = DeSotoSystem::new(specs, bandgap_for("monoSi").unwrap(), 25.0);
        let x = DVector::from_vec(vec![sdm.I_L_ref, sdm.I_o_ref, sdm.a_ref, sdm.R_sh_ref, sdm.R_s]);
        assert!(system.residuals(&x).norm() < 1e-5);
    }

    #[test]
    fn test_silicon_module_converges_within_default_budget() {
        let system = DeSotoSystem::new(silicon_module(), bandgap_for("monoSi").unwrap(), 25.0);
        let x0 = DVector::from_vec(system.initial_guess().to_vec());
        let settings = LMSettings::default();
        let result =
            LevenbergMarquardt::new(settings).solve(&|p: &DVector<f64>| system.residuals(p), &x0);
        assert!(result.success, "status {:?} after {}", result.status, result.n_fev);
        assert!(result.status.is_success());
        assert!(result.n_fev <= settings.max_fev);
        assert!(result.residual_norm < 1e-5);
        assert!(result.x[2] > 0.0 && result.x[3] > 0.0);
    }

    #[test]
    fn test_fitted_model_reproduces_datasheet_points() {
        let specs = silicon_module();
        let sdm = fit_sdm_desoto("polySi", &specs, 25.0, 1000.0).unwrap();
        let sde = sdm.to_sde();
        assert_relative_eq!(i_from_v(&sde, 0.0).unwrap(), specs.i_sc, max_relative = 1e-4);
        assert!(i_from_v(&sde, specs.v_oc).unwrap().abs() < 1e-4);
        assert_relative_eq!(i_from_v(&sde, specs.v_mp).unwrap(), specs.i_mp, max_relative = 1e-4);
    }

    #[test]
    fn test_fit_sdm_desoto_reference_values() {
        let specs = DatasheetSpecs {
            v_mp: 31.0,
            i_mp: 8.71,
            v_oc: 38.3,
            i_sc: 9.43,
            // 0.005658 A/K and -0.13788 V/K
            alpha_sc: 0.06,
            beta_voc: -0.36,
            cells_in_series: 60,
        };
        let sdm = fit_sdm_desoto("multisi", &specs, 25.0, 1000.0).unwrap();
        assert_relative_eq!(sdm.I_L_ref, 9.45232, max_relative = 1e-3);
        assert_relative_eq!(sdm.I_o_ref, 3.22460e-10, max_relative = 1e-2);
        assert_relative_eq!(sdm.a_ref, 1.59128, max_relative = 1e-3);
        assert_relative_eq!(sdm.R_sh_ref, 125.798, max_relative = 1e-2);
        assert_relative_eq!(sdm.R_s, 0.297814, max_relative = 1e-2);
        assert_relative_eq!(sdm.alpha_sc, 0.005658, max_relative = 1e-12);
    }

    #[test]
    fn test_fit_sdm_desoto_celltype_errors() {
        let specs = silicon_module();
        assert!(matches!(
            fit_sdm_desoto("cigs", &specs, 25.0, 1000.0),
            Err(ExtractionError::UnsupportedTechnology(_))
        ));
        assert!(matches!(
            fit_sdm_desoto("foobar", &specs, 25.0, 1000.0),
            Err(ExtractionError::UnknownTechnology(_))
        ));
    }

    #[test]
    fn test_solver_budget_exhausted() {
        let backend = NalgebraBackend::with_lm_settings(LMSettings {
            max_fev: 1,
            ..LMSettings::default()
        });
        let err = fit_sdm_desoto_with(&backend, "monosi", &silicon_module(), 25.0, 1000.0)
            .unwrap_err();
        match err {
            ExtractionError::SolverDidNotConverge { status, n_fev, .. } => {
                assert_eq!(status, LMStatus::MaxFevReached);
                assert!(n_fev >= 1);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_residuals_at_initial_guess() {
        let system = DeSotoSystem::new(silicon_module(), bandgap_for("monosi").unwrap(), 25.0);
        let guess = system.initial_guess();
        let r = system.residuals(&DVector::from_vec(guess.to_vec()));
        assert_eq!(r.len(), 5);
        assert!(r.iter().all(|v| v.is_finite()));
        // the guess is not a solution
        assert!(r.norm() > 1e-3);
    }

    #[test]
    fn test_invalid_specs() {
        let mut specs = silicon_module();
        specs.v_oc = -1.0;
        assert!(matches!(
            fit_sdm_desoto("monosi", &specs, 25.0, 1000.0),
            Err(ExtractionError::InvalidInput(_))
        ));
    }
}
