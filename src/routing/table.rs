//! The application's route declarations.

use crate::routing::route::RouteDef;

/// Page served when nothing else matches.
pub const NOT_FOUND_PATH: &str = "/404";

/// Routes of the CareerTrack frontend, in declaration order.
///
/// `/` and `/textbook` are deliberate aliases of the same page, and the
/// login page serves both `/login` and `/registration`; the page reads
/// `isLogin` to pick its mode.
pub fn app_routes() -> Vec<RouteDef> {
    vec![
        RouteDef::page("/login", "Login Page", "pages/login/index.vue").with_meta("isLogin", true),
        RouteDef::page("/registration", "Registration", "pages/login/index.vue")
            .with_meta("isLogin", false),
        RouteDef::page("/profile", "Profile Page", "pages/profile/index.vue"),
        RouteDef::page("/settings", "Settings Page", "pages/settings/index.vue"),
        RouteDef::page("/debug", "Debug", "pages/debug/index.vue"),
        RouteDef::page("/", "Textbook", "pages/textbook/index.vue"),
        RouteDef::page("/textbook", "Textbook", "pages/textbook/index.vue"),
        RouteDef::page("/quiz", "Quiz", "pages/quiz/index.vue"),
        RouteDef::page("/activity", "Activity", "pages/activity/index.vue"),
        RouteDef::page("/auth/google/callback", "Google Auth", "pages/google_redirect/index.vue"),
        RouteDef::page(NOT_FOUND_PATH, "404", "pages/error404/index.vue"),
        RouteDef::redirect("/:pathMatch(.*)*", NOT_FOUND_PATH),
    ]
}
