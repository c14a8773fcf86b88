// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! TypeScript declarations for the synthetic modules.

/// Ambient module declarations matching what the hooks emit: CSS Modules
/// export a class map, plain stylesheets export their path.
pub const TYPE_DECLARATIONS: &str = r#"declare module "*.module.scss" {
    const styles: {
        readonly [className: string]: string;
    };

    export default styles;
}

declare module "*.module.css" {
    const styles: {
        readonly [className: string]: string;
    };

    export default styles;
}

declare module "*.css" {
    const filePath: string;
    export default filePath;
}

declare module "*.scss" {
    const filePath: string;
    export default filePath;
}
"#;
